//! Transaction and mutation integration tests.
//!
//! These exercise the space accounting of commits: where payloads land,
//! how redundancy grows and shrinks, and what happens to the file when a
//! mutation is rejected or a commit is interrupted.

mod common;

use pck::progress::{NoProgress, progress_fn};
use pck::{Archive, ArchiveOptions, Error};

use common::Scratch;

fn entry_offset(archive: &Archive, name: &str) -> u64 {
    archive.entry_by_name(name).unwrap().offset
}

// =============================================================================
// Statistics
// =============================================================================

#[test]
fn test_stats_balance_through_mixed_operations() {
    let scratch = Scratch::new("mixed.pck");
    let entries = common::sample_entries(12);
    let mut archive = common::create_archive(&scratch.path, &common::as_refs(&entries)).unwrap();
    common::assert_stats_balance(&archive);

    archive.begin_transaction().unwrap();
    let ids: Vec<_> = archive.entries().iter().map(|e| e.id).collect();
    archive.delete(ids[3]).unwrap();
    archive.update_bytes(ids[5], common::random_bytes(99, 5000)).unwrap();
    archive.update_bytes(ids[6], b"short".to_vec()).unwrap();
    archive.rename(ids[7], "renamed\\seven.dat").unwrap();
    archive.add_bytes("new\\file.txt", common::text_bytes(3, 800)).unwrap();
    let result = archive.commit_transaction(&mut NoProgress).unwrap();

    assert_eq!(result.deleted, 1);
    assert_eq!(result.updated, 2);
    assert_eq!(result.renamed, 1);
    assert_eq!(result.added, 1);
    assert_eq!(result.total(), 5);
    common::assert_stats_balance(&archive);
    drop(archive);

    let reopened = Archive::open(&scratch.path).unwrap();
    assert_eq!(reopened.len(), 12);
    common::assert_stats_balance(&reopened);
    assert_eq!(
        reopened.read_by_name("renamed/seven.dat").unwrap(),
        entries[7].1
    );
    assert_eq!(reopened.read_by_name(&entries[6].0).unwrap(), b"short");
}

// =============================================================================
// Deletion
// =============================================================================

#[test]
fn test_delete_middle_entry_leaves_redundancy() {
    let scratch = Scratch::new("delete.pck");
    let a = common::random_bytes(1, 300);
    let b = common::random_bytes(2, 400);
    let c = common::random_bytes(3, 500);
    let mut archive =
        common::create_archive(&scratch.path, &[("a", &a), ("b", &b), ("c", &c)]).unwrap();
    let size_before = archive.stats().file_size;
    let b_stored = archive.entry_by_name("b").unwrap().compressed_size;

    archive.delete_by_name("b").unwrap();

    let stats = archive.stats();
    assert_eq!(stats.redundancy, u64::from(b_stored));
    assert!(stats.file_size < size_before);
    common::assert_stats_balance(&archive);
    drop(archive);
    common::verify_archive_contents(&scratch.path, &[("a", &a), ("c", &c)]);
}

#[test]
fn test_delete_last_entry_reclaims_space() {
    let scratch = Scratch::new("tail.pck");
    let a = common::random_bytes(1, 300);
    let b = common::random_bytes(2, 400);
    let mut archive = common::create_archive(&scratch.path, &[("a", &a), ("b", &b)]).unwrap();

    archive.delete_by_name("b").unwrap();

    let stats = archive.stats();
    assert_eq!(stats.redundancy, 0);
    assert_eq!(archive.index_address(), 12 + 300);
    common::assert_stats_balance(&archive);
}

#[test]
fn test_delete_everything() {
    let scratch = Scratch::new("all.pck");
    let entries = common::sample_entries(5);
    let mut archive = common::create_archive(&scratch.path, &common::as_refs(&entries)).unwrap();

    archive.begin_transaction().unwrap();
    for id in archive.entries().iter().map(|e| e.id).collect::<Vec<_>>() {
        archive.delete(id).unwrap();
    }
    let _ = archive.commit_transaction(&mut NoProgress).unwrap();

    assert!(archive.is_empty());
    assert_eq!(archive.stats().file_size, common::FIXED_OVERHEAD);
    assert_eq!(std::fs::metadata(&scratch.path).unwrap().len(), 300);
}

#[test]
fn test_delete_directory() {
    let scratch = Scratch::new("dirs.pck");
    let mut archive = common::create_archive(
        &scratch.path,
        &[
            ("gfx\\a.dds", b"a"),
            ("GFX\\ui\\b.dds", b"b"),
            ("gfxother\\c.dds", b"c"),
            ("gfx", b"d"),
        ],
    )
    .unwrap();

    assert_eq!(archive.delete_directory("gfx/").unwrap(), 2);
    let names: Vec<_> = archive.entries().iter().map(|e| e.name().to_string()).collect();
    assert_eq!(names, ["gfxother\\c.dds", "gfx"]);

    assert_eq!(archive.delete_directory("missing").unwrap(), 0);
    assert_eq!(archive.delete_directory("").unwrap(), 0);
    assert_eq!(archive.len(), 2);
}

// =============================================================================
// Updates
// =============================================================================

#[test]
fn test_update_smaller_reuses_slot() {
    let scratch = Scratch::new("smaller.pck");
    let a = common::random_bytes(1, 200);
    let b = common::random_bytes(2, 200);
    let mut archive = common::create_archive(&scratch.path, &[("a", &a), ("b", &b)]).unwrap();
    let offset = entry_offset(&archive, "a");
    let id = archive.entry_by_name("a").unwrap().id;

    let smaller = common::random_bytes(3, 150);
    archive.update_bytes(id, smaller.clone()).unwrap();

    assert_eq!(entry_offset(&archive, "a"), offset);
    assert_eq!(archive.stats().redundancy, 50);
    common::assert_stats_balance(&archive);

    let same = common::random_bytes(4, 150);
    archive.update_bytes(id, same.clone()).unwrap();
    assert_eq!(entry_offset(&archive, "a"), offset);
    assert_eq!(archive.stats().redundancy, 50);
    drop(archive);

    common::verify_archive_contents(&scratch.path, &[("a", &same), ("b", &b)]);
}

#[test]
fn test_update_larger_appends() {
    let scratch = Scratch::new("larger.pck");
    let a = common::random_bytes(1, 200);
    let b = common::random_bytes(2, 300);
    let mut archive = common::create_archive(&scratch.path, &[("a", &a), ("b", &b)]).unwrap();
    let old = archive.entry_by_name("a").unwrap().clone();
    let tail = archive.index_address();

    let larger = common::random_bytes(3, 1000);
    archive.update_bytes(old.id, larger.clone()).unwrap();

    let updated = archive.entry_by_name("a").unwrap();
    assert_eq!(updated.offset, tail);
    assert_eq!(updated.id, old.id);
    assert_eq!(
        archive.stats().redundancy,
        u64::from(old.compressed_size)
    );
    common::assert_stats_balance(&archive);
    drop(archive);

    common::verify_archive_contents(&scratch.path, &[("a", &larger), ("b", &b)]);
}

#[test]
fn test_update_file_source() {
    let scratch = Scratch::new("file.pck");
    let mut archive = common::create_archive(&scratch.path, &[("cfg.ini", b"old")]).unwrap();
    let source = scratch.join("cfg.ini");
    std::fs::write(&source, b"[section]\nkey=value\n").unwrap();

    let id = archive.entry_by_name("cfg.ini").unwrap().id;
    archive.update_file(id, &source).unwrap();
    assert_eq!(
        archive.read_by_name("cfg.ini").unwrap(),
        b"[section]\nkey=value\n"
    );
}

#[test]
fn test_add_existing_name_updates() {
    let scratch = Scratch::new("replace.pck");
    let mut archive = common::create_archive(&scratch.path, &[("Data\\A.txt", b"one")]).unwrap();

    archive.add_bytes("data/a.TXT", b"two".to_vec()).unwrap();

    assert_eq!(archive.len(), 1);
    assert_eq!(archive.entries()[0].name(), "Data\\A.txt");
    assert_eq!(archive.read_by_name("data\\a.txt").unwrap(), b"two");
}

// =============================================================================
// Rejected mutations
// =============================================================================

#[test]
fn test_oversized_item_rejected_without_touching_file() {
    let scratch = Scratch::new("limit.pck");
    let options = ArchiveOptions::new().max_item_size(100);
    let mut archive =
        common::create_archive_with_options(&scratch.path, &options, &[("a", b"small")]).unwrap();
    let before = std::fs::read(&scratch.path).unwrap();

    let err = archive.add_bytes("big", vec![0u8; 100]).unwrap_err();
    assert!(matches!(
        err,
        Error::SizeLimitExceeded {
            size: 100,
            limit: 100,
            ..
        }
    ));
    let id = archive.entries()[0].id;
    assert!(matches!(
        archive.update_bytes(id, vec![0u8; 150]),
        Err(Error::SizeLimitExceeded { .. })
    ));

    assert_eq!(std::fs::read(&scratch.path).unwrap(), before);
    assert_eq!(archive.len(), 1);

    archive.add_bytes("fits", vec![0u8; 99]).unwrap();
    assert_eq!(archive.len(), 2);
}

#[test]
fn test_oversized_file_rejected() {
    let scratch = Scratch::new("limit_file.pck");
    let options = ArchiveOptions::new().max_item_size(64);
    let mut archive = common::create_archive_with_options(&scratch.path, &options, &[]).unwrap();
    let source = scratch.join("big.bin");
    std::fs::write(&source, vec![1u8; 64]).unwrap();

    assert!(matches!(
        archive.add_file(&source, "big.bin"),
        Err(Error::SizeLimitExceeded { .. })
    ));
    assert!(archive.is_empty());
}

#[test]
fn test_invalid_names_rejected() {
    let scratch = Scratch::new("names.pck");
    let mut archive = Archive::create(&scratch.path, false).unwrap();

    for bad in ["", " \\ / ", "nul\0byte"] {
        assert!(
            matches!(
                archive.add_bytes(bad, b"x".to_vec()),
                Err(Error::InvalidName { .. })
            ),
            "{:?} should be rejected",
            bad
        );
    }
    let long = "x".repeat(256);
    assert!(matches!(
        archive.add_bytes(&long, b"x".to_vec()),
        Err(Error::InvalidName { .. })
    ));
    archive.add_bytes(&"x".repeat(255), b"x".to_vec()).unwrap();
}

#[test]
fn test_read_only_rejects_mutation() {
    let scratch = Scratch::new("ro.pck");
    drop(common::create_archive(&scratch.path, &[("a", b"a")]).unwrap());
    let before = std::fs::read(&scratch.path).unwrap();

    let mut archive = Archive::open(&scratch.path).unwrap();
    assert!(archive.is_read_only());
    assert!(matches!(archive.begin_transaction(), Err(Error::ReadOnly)));
    assert!(matches!(
        archive.add_bytes("b", b"b".to_vec()),
        Err(Error::ReadOnly)
    ));
    assert!(matches!(archive.delete_by_name("a"), Err(Error::ReadOnly)));
    assert!(matches!(
        archive.commit_transaction(&mut NoProgress),
        Err(Error::ReadOnly)
    ));
    drop(archive);

    assert_eq!(std::fs::read(&scratch.path).unwrap(), before);
}

// =============================================================================
// Renames
// =============================================================================

#[test]
fn test_rename_collisions() {
    let scratch = Scratch::new("rename.pck");
    let mut archive = common::create_archive(&scratch.path, &[("a", b"a"), ("b", b"b")]).unwrap();
    let a = archive.entry_by_name("a").unwrap().id;
    let b = archive.entry_by_name("b").unwrap().id;

    assert!(matches!(
        archive.rename(a, "B"),
        Err(Error::EntryExists { .. })
    ));

    archive.begin_transaction().unwrap();
    archive.add_bytes("c", b"c".to_vec()).unwrap();
    assert!(matches!(
        archive.rename(a, "C"),
        Err(Error::EntryExists { .. })
    ));
    archive.rename(a, "d").unwrap();
    assert!(matches!(
        archive.rename(b, "D"),
        Err(Error::EntryExists { .. })
    ));
    // Changing only the case of the entry's own name is allowed.
    archive.rename(b, "B").unwrap();
    let result = archive.commit_transaction(&mut NoProgress).unwrap();
    assert_eq!(result.renamed, 2);

    let names: Vec<_> = archive.entries().iter().map(|e| e.name().to_string()).collect();
    assert_eq!(names, ["d", "B", "c"]);
    assert_eq!(archive.read_by_name("D").unwrap(), b"a");
}

// =============================================================================
// Transactions
// =============================================================================

#[test]
fn test_cancelled_transaction_leaves_file_untouched() {
    let scratch = Scratch::new("cancel.pck");
    let mut archive = common::create_archive(&scratch.path, &[("a", b"a")]).unwrap();
    let before = std::fs::read(&scratch.path).unwrap();

    archive.begin_transaction().unwrap();
    archive.add_bytes("b", b"b".to_vec()).unwrap();
    archive.delete_by_name("a").unwrap();
    assert_eq!(archive.pending_count(), 2);
    assert_eq!(archive.pending_operations()[1].operation_type(), "delete");
    assert_eq!(archive.cancel_transaction(), 2);

    assert_eq!(archive.len(), 1);
    assert_eq!(std::fs::read(&scratch.path).unwrap(), before);
}

#[test]
fn test_nested_begin_keeps_queue() {
    let scratch = Scratch::new("nested.pck");
    let mut archive = Archive::create(&scratch.path, false).unwrap();

    archive.begin_transaction().unwrap();
    archive.add_bytes("a", b"a".to_vec()).unwrap();
    archive.begin_transaction().unwrap();
    archive.add_bytes("b", b"b".to_vec()).unwrap();
    assert_eq!(archive.pending_count(), 2);

    let result = archive.commit_transaction(&mut NoProgress).unwrap();
    assert_eq!(result.added, 2);
    assert!(!archive.is_in_transaction());
}

#[test]
fn test_interrupted_commit_keeps_applied_prefix() {
    let scratch = Scratch::new("interrupt.pck");
    let mut archive = Archive::create(&scratch.path, false).unwrap();

    archive.begin_transaction().unwrap();
    for i in 0..5 {
        archive
            .add_bytes(&format!("file{}.bin", i), common::random_bytes(i, 64))
            .unwrap();
    }
    let mut stop_after_three = progress_fn(|current, _total| current < 3);
    let err = archive.commit_transaction(&mut stop_after_three).unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(!archive.is_in_transaction());
    assert_eq!(archive.len(), 3);
    common::assert_stats_balance(&archive);
    drop(archive);

    let reopened = Archive::open(&scratch.path).unwrap();
    assert_eq!(reopened.len(), 3);
    assert_eq!(
        reopened.read_by_name("file2.bin").unwrap(),
        common::random_bytes(2, 64)
    );
}

#[test]
fn test_update_after_delete_is_skipped() {
    let scratch = Scratch::new("skip.pck");
    let mut archive = common::create_archive(&scratch.path, &[("a", b"a"), ("b", b"b")]).unwrap();
    let a = archive.entry_by_name("a").unwrap().id;

    archive.begin_transaction().unwrap();
    archive.delete(a).unwrap();
    archive.update_bytes(a, b"late".to_vec()).unwrap();
    archive.rename(a, "z").unwrap();
    let result = archive.commit_transaction(&mut NoProgress).unwrap();

    assert_eq!(result.deleted, 1);
    assert_eq!(result.skipped, 2);
    assert_eq!(archive.len(), 1);
    assert!(!archive.contains("z"));
}

#[test]
fn test_progress_reports_each_operation() {
    let scratch = Scratch::new("progress.pck");
    let mut archive = Archive::create(&scratch.path, false).unwrap();
    archive.begin_transaction().unwrap();
    for i in 0..4 {
        archive.add_bytes(&format!("{}", i), vec![i as u8; 10]).unwrap();
    }

    let mut seen = Vec::new();
    let mut progress = progress_fn(|current, total| {
        seen.push((current, total));
        true
    });
    let _ = archive.commit_transaction(&mut progress).unwrap();
    drop(progress);

    assert_eq!(seen, [(0, 4), (1, 4), (2, 4), (3, 4), (4, 4)]);
}
