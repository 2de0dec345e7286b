use mosaic_core::{Entry, GridMode, MosaicError, MosaicStore, SettingsUpdate};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn manual_grid(store: &MosaicStore, rows: u32, cols: u32, max_entries: u32) {
    store
        .update_settings(&SettingsUpdate {
            grid_mode: Some(GridMode::Manual),
            grid_rows: Some(rows),
            grid_cols: Some(cols),
            max_entries: Some(max_entries),
            ..SettingsUpdate::default()
        })
        .unwrap();
}

fn submit_from_threads(
    stores: &[Arc<MosaicStore>],
    threads: usize,
    per_thread: usize,
) -> Vec<Result<Entry, MosaicError>> {
    let handles: Vec<_> = (0..threads)
        .map(|worker| {
            let store = Arc::clone(&stores[worker % stores.len()]);
            thread::spawn(move || {
                (0..per_thread)
                    .map(|index| {
                        store.submit(&format!("worker {worker} #{index}"), "Together", "diya.png")
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect()
}

#[test]
fn concurrent_submissions_get_distinct_positions() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MosaicStore::open(dir.path().join("mosaic.sqlite3")).unwrap());
    manual_grid(&store, 10, 10, 100);

    let results = submit_from_threads(&[Arc::clone(&store)], 8, 10);

    let positions: Vec<u32> = results
        .into_iter()
        .map(|result| result.unwrap().position.unwrap())
        .collect();
    let distinct: HashSet<u32> = positions.iter().copied().collect();
    assert_eq!(positions.len(), 80);
    assert_eq!(distinct.len(), 80);

    let live = store.all_entries();
    assert_eq!(live.len(), 80);
    let live_positions: HashSet<u32> = live.iter().filter_map(|entry| entry.position).collect();
    assert_eq!(live_positions, distinct);
}

#[test]
fn concurrent_submissions_across_connections_share_one_grid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mosaic.sqlite3");
    let first = Arc::new(MosaicStore::open(&path).unwrap());
    let second = Arc::new(MosaicStore::open(&path).unwrap());
    manual_grid(&first, 6, 6, 36);

    let results = submit_from_threads(&[first, Arc::clone(&second)], 6, 6);

    let positions: HashSet<u32> = results
        .into_iter()
        .map(|result| result.unwrap().position.unwrap())
        .collect();
    assert_eq!(positions, (0..36).collect::<HashSet<u32>>());
    assert_eq!(second.all_entries().len(), 36);
}

#[test]
fn racing_for_the_last_tiles_fills_grid_exactly_once() {
    let store = Arc::new(MosaicStore::open_in_memory().unwrap());
    manual_grid(&store, 2, 2, 10);

    let results = submit_from_threads(&[Arc::clone(&store)], 4, 3);

    let accepted: Vec<Entry> = results
        .iter()
        .filter_map(|result| result.as_ref().ok().cloned())
        .collect();
    let exhausted = results
        .iter()
        .filter(|result| matches!(result, Err(err) if err.is_capacity_exhausted()))
        .count();
    assert_eq!(accepted.len(), 4);
    assert_eq!(exhausted, 8);

    let positions: HashSet<u32> = accepted.iter().filter_map(|entry| entry.position).collect();
    assert_eq!(positions, HashSet::from([0, 1, 2, 3]));
}

#[test]
fn concurrent_admin_edits_never_tear_the_settings_document() {
    let store = Arc::new(MosaicStore::open_in_memory().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for index in 0..5 {
                    store
                        .add_symbol(&format!("w{worker}_{index}.png"), "Extra")
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let symbols = store.settings().symbols;
    assert_eq!(symbols.len(), 3 + 20);
    let filenames: HashSet<&str> = symbols.iter().map(|s| s.filename.as_str()).collect();
    assert_eq!(filenames.len(), symbols.len());
}
