use std::collections::HashSet;
use std::thread;

use rand::Rng;

use crate::fs::{
    AllocationEngine, BlockState, CapacityStats, DiskState, FsError, PartialPolicy, SharedDisk,
    Strategy, MAX_BLOCKS,
};

fn occupied(disk: &DiskState) -> Vec<usize> {
    disk.snapshot()
        .iter()
        .enumerate()
        .filter(|(_, state)| !state.is_free())
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn init_bounds() {
    assert!(matches!(DiskState::init(0), Err(FsError::InvalidConfig(_))));
    assert!(matches!(
        DiskState::init(MAX_BLOCKS + 1),
        Err(FsError::InvalidConfig(_))
    ));
    assert_eq!(DiskState::init(MAX_BLOCKS).unwrap().total_blocks(), MAX_BLOCKS);
    // 调用者可以放宽上限
    assert_eq!(
        DiskState::with_limit(5000, 10_000).unwrap().free_count(),
        5000
    );
}

#[test]
fn fresh_disk_is_all_free() {
    let disk = DiskState::init(73).unwrap();
    let free: Vec<usize> = disk.free_block_indices().collect();
    assert_eq!(free, (0..73).collect::<Vec<_>>());
    assert!(disk.snapshot().iter().all(|s| *s == BlockState::Free));
    assert_eq!(disk.occupancy_vector(), vec![0u8; 73]);
    // 可以重新开始遍历
    assert_eq!(disk.free_block_indices().count(), 73);
}

#[test]
fn block_access_is_bounds_checked() {
    let mut disk = DiskState::init(10).unwrap();
    assert_eq!(
        disk.occupy(10),
        Err(FsError::OutOfRange { index: 10, total: 10 })
    );
    assert!(disk.release(11).is_err());
    assert!(disk.is_free(42).is_err());
    disk.occupy(9).unwrap();
    assert!(!disk.is_free(9).unwrap());
    assert_eq!(disk.state(9).unwrap(), BlockState::Occupied);
    disk.release(9).unwrap();
    disk.release(9).unwrap();
    assert!(disk.is_free(9).unwrap());
}

#[test]
fn stats_example() {
    let stats = CapacityStats::compute(20, 1024, 4).unwrap();
    assert_eq!(stats.pointers_per_block, 256);
    assert_eq!(stats.max_theoretical_size, 10 + 256 + 65536 + 16777216);
    assert_eq!(stats.max_real_size, 20);
    assert!(stats.feasibility.is_feasible());
}

#[test]
fn contiguous_is_all_or_nothing() {
    let engine = AllocationEngine::default();
    let mut disk = DiskState::init(10).unwrap();
    let file = engine
        .allocate(&mut disk, Strategy::Contiguous, 5)
        .unwrap();
    assert_eq!(file.blocks, vec![0, 1, 2, 3, 4]);
    assert_eq!(disk.free_count(), 5);

    let before = disk.clone();
    assert_eq!(
        engine.allocate(&mut disk, Strategy::Contiguous, 6),
        Err(FsError::InsufficientSpace {
            requested: 6,
            claimed: Vec::new()
        })
    );
    assert_eq!(disk, before);
    assert_eq!(occupied(&disk), vec![0, 1, 2, 3, 4]);
}

#[test]
fn contiguous_picks_first_fit() {
    let engine = AllocationEngine::default();
    let mut disk = DiskState::init(30).unwrap();
    // 空闲窗口: [2, 4), [7, 12), [15, 30)
    for block in [0, 1, 4, 5, 6, 12, 13, 14] {
        disk.occupy(block).unwrap();
    }
    let file = engine
        .allocate(&mut disk, Strategy::Contiguous, 3)
        .unwrap();
    assert_eq!(file.blocks, vec![7, 8, 9]);
    let file = engine
        .allocate(&mut disk, Strategy::Contiguous, 2)
        .unwrap();
    assert_eq!(file.blocks, vec![2, 3]);
    let file = engine
        .allocate(&mut disk, Strategy::Contiguous, 6)
        .unwrap();
    assert_eq!(file.blocks, (15..21).collect::<Vec<_>>());
}

#[test]
fn contiguous_larger_than_disk() {
    let engine = AllocationEngine::default();
    let mut disk = DiskState::init(4).unwrap();
    assert!(engine.allocate(&mut disk, Strategy::Contiguous, 5).is_err());
    assert_eq!(disk.free_count(), 4);
    let file = engine
        .allocate(&mut disk, Strategy::Contiguous, 4)
        .unwrap();
    assert_eq!(file.blocks, vec![0, 1, 2, 3]);
}

#[test]
fn chained_skips_occupied_blocks() {
    let engine = AllocationEngine::default();
    let mut disk = DiskState::init(10).unwrap();
    for block in [1, 3, 4] {
        disk.occupy(block).unwrap();
    }
    let file = engine.allocate(&mut disk, Strategy::Chained, 4).unwrap();
    assert_eq!(file.blocks, vec![0, 2, 5, 6]);
    assert_eq!(file.index_block, None);
    assert_eq!(disk.free_block_indices().collect::<Vec<_>>(), vec![7, 8, 9]);
}

#[test]
fn chained_partial_claim_is_kept() {
    let engine = AllocationEngine::new(PartialPolicy::Keep);
    let mut disk = DiskState::init(5).unwrap();
    assert_eq!(
        engine.allocate(&mut disk, Strategy::Chained, 8),
        Err(FsError::InsufficientSpace {
            requested: 8,
            claimed: vec![0, 1, 2, 3, 4]
        })
    );
    assert_eq!(disk.free_count(), 0);
}

#[test]
fn indexed_uses_an_index_block() {
    let engine = AllocationEngine::default();
    let mut disk = DiskState::init(10).unwrap();
    disk.occupy(1).unwrap();
    let file = engine.allocate(&mut disk, Strategy::Indexed, 3).unwrap();
    assert_eq!(file.index_block, Some(0));
    assert_eq!(file.blocks, vec![2, 3, 4]);
    assert_eq!(file.all_blocks().collect::<Vec<_>>(), vec![0, 2, 3, 4]);
    assert_eq!(disk.free_count(), 5);
}

#[test]
fn indexed_partial_claim() {
    let engine = AllocationEngine::default();
    let mut disk = DiskState::init(6).unwrap();
    disk.occupy(2).unwrap();
    // 部分占用后的块正好是调用前所有的空闲块
    let free_before: Vec<usize> = disk.free_block_indices().collect();
    match engine.allocate(&mut disk, Strategy::Indexed, 10) {
        Err(FsError::InsufficientSpace { requested, claimed }) => {
            assert_eq!(requested, 10);
            assert_eq!(claimed, free_before);
        }
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(disk.free_count(), 0);

    // 连索引块都没有
    assert_eq!(
        engine.allocate(&mut disk, Strategy::Indexed, 1),
        Err(FsError::InsufficientSpace {
            requested: 1,
            claimed: Vec::new()
        })
    );
}

#[test]
fn rollback_makes_every_strategy_atomic() {
    let engine = AllocationEngine::new(PartialPolicy::Rollback);
    for strategy in [Strategy::Chained, Strategy::Contiguous, Strategy::Indexed] {
        let mut disk = DiskState::init(8).unwrap();
        disk.occupy(3).unwrap();
        let before = disk.clone();
        assert_eq!(
            engine.allocate(&mut disk, strategy, 8),
            Err(FsError::InsufficientSpace {
                requested: 8,
                claimed: Vec::new()
            })
        );
        assert_eq!(disk, before, "{} left blocks behind", strategy);
    }
}

#[test]
fn release_frees_exactly_the_record() {
    let engine = AllocationEngine::default();
    let mut disk = DiskState::init(12).unwrap();
    let a = engine.allocate(&mut disk, Strategy::Indexed, 3).unwrap();
    let b = engine.allocate(&mut disk, Strategy::Chained, 2).unwrap();
    engine.release(&mut disk, &a).unwrap();
    assert_eq!(occupied(&disk), b.blocks);
}

#[test]
fn delete_then_reallocate() {
    let engine = AllocationEngine::default();
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let total = rng.gen_range(1..=MAX_BLOCKS);
        let mut disk = DiskState::init(total).unwrap();
        // 随机占用一部分块
        for block in 0..total {
            if rng.gen_bool(0.6) {
                disk.occupy(block).unwrap();
            }
        }
        let start = rng.gen_range(0..total);
        let count = rng.gen_range(0..=total - start);
        let still_occupied: HashSet<usize> = occupied(&disk)
            .into_iter()
            .filter(|b| !(start..start + count).contains(b))
            .collect();

        let range = engine.delete(&mut disk, start, count).unwrap();
        assert_eq!(range, start..start + count);
        let now_free: HashSet<usize> = disk.free_block_indices().collect();

        let file = engine.allocate(&mut disk, Strategy::Chained, count).unwrap();
        assert_eq!(file.blocks.len(), count);
        assert!(file.blocks.windows(2).all(|w| w[0] < w[1]));
        for block in &file.blocks {
            assert!(now_free.contains(block));
            assert!(!still_occupied.contains(block));
        }
    }
}

#[test]
fn shared_disk_serializes_allocations() {
    let shared = SharedDisk::new(
        DiskState::init(MAX_BLOCKS).unwrap(),
        AllocationEngine::default(),
    );
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let shared = shared.clone();
            let strategy = [Strategy::Chained, Strategy::Contiguous, Strategy::Indexed][i % 3];
            thread::spawn(move || {
                (0..5)
                    .map(|_| shared.allocate(strategy, 4).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for file in handle.join().unwrap() {
            for block in file.all_blocks() {
                // 两个文件不会拿到同一个块
                assert!(seen.insert(block));
            }
        }
    }
    assert_eq!(shared.read(|disk| disk.occupied_count()), seen.len());

    shared.delete(0, MAX_BLOCKS).unwrap();
    assert!(shared.snapshot().iter().all(|s| s.is_free()));
    shared.reinit(DiskState::init(3).unwrap());
    assert_eq!(shared.read(|disk| disk.total_blocks()), 3);
}
