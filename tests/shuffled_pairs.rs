//! Pairing is by read id only: shuffling or thinning one mate file must not
//! change which pairs survive or the order within each output.

use matesect::id_set::{read_id_set_from_path, read_ids_from_path};
use matesect::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs;
use std::io::Cursor;
use tempfile::tempdir;

fn read_id_for(i: usize) -> String {
    format!("@MISEQ578:1:1101:{}:{}#TTCAGA", 1000 + i, 2000 + i * 7)
}

fn fastq(ids: &[String], mate: u8) -> String {
    ids.iter()
        .map(|id| format!("{}/{}\nACGTACGT\n+\nIIIIIIII\n", id, mate))
        .collect()
}

fn output_ids(output: &[u8]) -> Vec<String> {
    read_ids(FastqReader::new(output)).unwrap()
}

#[test]
fn test_shuffled_reverse_keeps_forward_order() {
    let mut rng = SmallRng::seed_from_u64(42);
    let forward_ids: Vec<String> = (0..500).map(read_id_for).collect();

    let mut reverse_ids: Vec<String> = forward_ids
        .iter()
        .filter(|_| rng.gen_bool(0.7))
        .cloned()
        .collect();
    reverse_ids.shuffle(&mut rng);

    let forward = fastq(&forward_ids, 1);
    let reverse = fastq(&reverse_ids, 2);
    let mut out_forward = Vec::new();
    let mut out_reverse = Vec::new();

    let stats = IntersectCommand::new()
        .run_streaming(
            &mut Cursor::new(forward.as_bytes()),
            &mut Cursor::new(reverse.as_bytes()),
            &mut out_forward,
            &mut out_reverse,
        )
        .unwrap();

    let expected_forward: Vec<String> = forward_ids
        .iter()
        .filter(|id| reverse_ids.contains(id))
        .cloned()
        .collect();

    assert_eq!(stats.common_ids, reverse_ids.len());
    assert_eq!(stats.forward_written, stats.reverse_written);
    assert_eq!(output_ids(&out_forward), expected_forward);
    assert_eq!(output_ids(&out_reverse), reverse_ids);
}

#[test]
fn test_intersection_is_commutative() {
    let mut rng = SmallRng::seed_from_u64(7);
    let all: Vec<String> = (0..200).map(read_id_for).collect();
    let left: Vec<String> = all.iter().filter(|_| rng.gen_bool(0.5)).cloned().collect();
    let right: Vec<String> = all.iter().filter(|_| rng.gen_bool(0.5)).cloned().collect();

    let cmd = IntersectCommand::new();
    let lr = cmd
        .common_ids(fastq(&left, 1).as_bytes(), fastq(&right, 2).as_bytes())
        .unwrap();
    let rl = cmd
        .common_ids(fastq(&right, 1).as_bytes(), fastq(&left, 2).as_bytes())
        .unwrap();

    assert_eq!(lr, rl);
    assert!(lr.iter().all(|id| left.contains(id) && right.contains(id)));
}

#[test]
fn test_path_helpers_and_rerun() {
    let dir = tempdir().unwrap();
    let forward = dir.path().join("r1.fastq");
    let reverse = dir.path().join("r2.fastq");
    let ids: Vec<String> = (0..20).map(read_id_for).collect();
    fs::write(&forward, fastq(&ids, 1)).unwrap();
    fs::write(&reverse, fastq(&ids[5..], 2)).unwrap();

    assert_eq!(read_ids_from_path(&forward).unwrap(), ids);
    let reverse_set = read_id_set_from_path(&reverse).unwrap();
    assert_eq!(reverse_set.len(), 15);

    let out_forward = dir.path().join("p1.fastq");
    let out_reverse = dir.path().join("p2.fastq");
    let cmd = IntersectCommand::new();
    let first = cmd
        .run(&forward, &reverse, &out_forward, &out_reverse)
        .unwrap();
    assert_eq!(first.forward_only(), 5);

    // A second pass over the paired output drops nothing.
    let again_forward = dir.path().join("q1.fastq");
    let again_reverse = dir.path().join("q2.fastq");
    let second = cmd
        .run(&out_forward, &out_reverse, &again_forward, &again_reverse)
        .unwrap();
    assert_eq!(second.forward_only(), 0);
    assert_eq!(second.reverse_only(), 0);
    assert_eq!(
        fs::read(&again_forward).unwrap(),
        fs::read(&out_forward).unwrap()
    );
}
