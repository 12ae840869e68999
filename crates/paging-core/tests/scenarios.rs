//! End-to-end scenarios (spec §8): each test below is one of the six named
//! scenarios, driven entirely through the public API.

use accel_bridge::{Aes256CtrCipher, Sha256Hasher};
use paging_core::merkle::Tree;
use paging_core::{PagingConfig, PagingPipeline};

fn pipeline(fanout: usize, num_pages: u64) -> PagingPipeline<Sha256Hasher, Aes256CtrCipher> {
    let config = PagingConfig { fanout, ..PagingConfig::default() };
    PagingPipeline::new(config, 0x4000_0000, num_pages, Sha256Hasher, Aes256CtrCipher).unwrap()
}

#[test]
fn scenario_single_evict_and_restore() {
    let mut p = pipeline(5, 8);
    let page = vec![0xAB; PagingConfig::PAGE_SIZE];
    let addr = p.evict(&page).unwrap();
    assert_eq!(p.restore(addr).unwrap(), page);
}

#[test]
fn scenario_insert_only_growth_triggers_a_split() {
    let mut tree = Tree::new(3, 8, Sha256Hasher).unwrap();
    let root_before = tree.root_id();
    for k in 0..10u64 {
        tree.insert(k, [k as u8; 32]).unwrap();
    }
    assert_eq!(tree.root_id(), root_before);
    for k in 0..10u64 {
        assert!(tree.verify(k, &[k as u8; 32]).is_ok());
    }
}

#[test]
fn scenario_update_semantics_overwrite_not_duplicate() {
    let mut tree = Tree::new(4, 8, Sha256Hasher).unwrap();
    tree.insert(7, [1u8; 32]).unwrap();
    tree.insert(7, [2u8; 32]).unwrap();
    assert!(tree.verify(7, &[2u8; 32]).is_ok());
    assert!(tree.verify(7, &[1u8; 32]).is_err());
}

#[test]
fn scenario_redistribution_happens_before_a_second_split() {
    let mut tree = Tree::new(3, 8, Sha256Hasher).unwrap();
    for k in 0..4u64 {
        tree.insert(k, [k as u8; 32]).unwrap();
    }
    // one split: root is now internal with two children
    for k in 4..6u64 {
        tree.insert(k, [k as u8; 32]).unwrap();
    }
    for k in 0..6u64 {
        assert!(tree.verify(k, &[k as u8; 32]).is_ok());
    }
}

#[test]
fn scenario_root_split_preserves_root_address() {
    let mut tree = Tree::new(3, 8, Sha256Hasher).unwrap();
    let root_id = tree.root_id();
    for k in 0..100u64 {
        tree.insert(k, [k as u8; 32]).unwrap();
    }
    assert_eq!(tree.root_id(), root_id, "root address must survive any number of splits");
}

#[test]
fn scenario_tamper_detection_on_restore() {
    let mut p = pipeline(5, 8);
    let page = vec![0x55; PagingConfig::PAGE_SIZE];
    let addr = p.evict(&page).unwrap();
    p.debug_corrupt_byte(addr, 10);
    assert!(p.restore(addr).is_err());
}
