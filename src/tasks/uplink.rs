// FarmWatch — Uplink Task
//
// Fire-and-forget publisher fed by the control task through a bounded queue.
// A slow or failing endpoint only costs dropped snapshots, never a late read
// cycle.

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

use crate::config::STACK_UPLINK;
use crate::events::CycleSnapshot;
use crate::uplink::{snapshot_json, Uplink};

pub fn spawn_uplink<U>(uplink: U, depth: usize) -> std::io::Result<SyncSender<CycleSnapshot>>
where
    U: Uplink + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(depth);
    thread::Builder::new()
        .name("uplink".into())
        .stack_size(STACK_UPLINK)
        .spawn(move || uplink_task(uplink, rx))?;
    Ok(tx)
}

pub fn uplink_task<U: Uplink>(mut uplink: U, rx: Receiver<CycleSnapshot>) {
    log::info!("Uplink task started");
    let (mut sent, mut failed) = (0u32, 0u32);

    for snapshot in rx {
        let body = snapshot_json(&snapshot);
        match uplink.publish(&body) {
            Ok(()) => sent += 1,
            Err(e) => {
                failed += 1;
                log::warn!("Uplink failed ({failed} of {}): {e:#}", sent + failed);
            }
        }
    }

    log::warn!("Snapshot channel closed, exiting uplink task");
}
