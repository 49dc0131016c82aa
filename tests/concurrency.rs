use std::thread;

use flexbot::store::{self, ALL_ROLES};

// Two connections hammering the same (match, player) pairs must land each
// pair exactly once; the unique index and busy timeout carry the race.
#[test]
fn concurrent_recorders_keep_rows_unique() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("race.sqlite");

    let conn = store::open_db(&db_path).expect("open db");
    assert!(store::insert_player(&conn, "UmbreonReaper", "umbreonreaper", "euw").expect("insert"));
    let player_id = store::find_player(&conn, "UmbreonReaper")
        .expect("query")
        .expect("registered")
        .id;
    drop(conn);

    let ids: Vec<String> = (0..20).map(|n| format!("EUW1_73000000{n:02}")).collect();

    let inserted: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(|| {
                    let conn = store::open_db(&db_path).expect("open db");
                    let mut inserted = 0;
                    for (i, match_id) in ids.iter().enumerate() {
                        let role = ALL_ROLES[i % ALL_ROLES.len()];
                        if store::record_participation(&conn, player_id, match_id, role, i % 2 == 0)
                            .expect("record")
                        {
                            inserted += 1;
                        }
                    }
                    inserted
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("recorder thread"))
            .sum()
    });
    assert_eq!(inserted, 20);

    let conn = store::open_db(&db_path).expect("open db");
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))
        .expect("count");
    assert_eq!(rows, 20);
}
