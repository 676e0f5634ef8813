// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use numerus_storage::{FileTaskStore, TaskStore};

pub fn run() -> i32 {
    match FileTaskStore::open_default() {
        Ok(store) => {
            crate::output::print_status_table(&store.list());
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}
