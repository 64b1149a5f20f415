use buddy_platform::{
    MemoryStorage, PlatformBridge, PlatformResult, SettingsStorage, ThreadAffinity, UiAction,
};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

/// A bridge whose "UI thread" is a dedicated worker draining a queue.
struct WorkerBridge {
    affinity: ThreadAffinity,
    queue: Mutex<mpsc::Sender<UiAction>>,
}

impl WorkerBridge {
    fn spawn() -> Arc<Self> {
        let (tx, rx) = mpsc::channel::<UiAction>();
        let (ready_tx, ready_rx) = mpsc::channel();
        thread::spawn(move || {
            ready_tx.send(ThreadAffinity::current()).unwrap();
            for action in rx {
                action();
            }
        });
        Arc::new(Self {
            affinity: ready_rx.recv().unwrap(),
            queue: Mutex::new(tx),
        })
    }
}

impl PlatformBridge for WorkerBridge {
    fn is_ui_thread(&self) -> bool {
        self.affinity.is_current()
    }

    fn invoke_on_ui_thread_core(&self, action: UiAction) {
        self.queue.lock().unwrap().send(action).unwrap();
    }
}

struct InlineBridge {
    storage: Option<Arc<dyn SettingsStorage>>,
}

impl PlatformBridge for InlineBridge {
    fn is_ui_thread(&self) -> bool {
        true
    }

    fn invoke_on_ui_thread_core(&self, _action: UiAction) {
        unreachable!("always on the UI thread");
    }

    fn get_config_setting(&self, key: &str) -> Option<String> {
        (key == "AppName").then(|| "demo".to_string())
    }

    fn storage_area(&self) -> PlatformResult<Option<Arc<dyn SettingsStorage>>> {
        Ok(self.storage.clone())
    }
}

// ── ThreadAffinity ───────────────────────────────────────────────

#[test]
fn affinity_matches_only_owner_thread() {
    let affinity = ThreadAffinity::current();
    assert!(affinity.is_current());
    assert_eq!(affinity.owner(), thread::current().id());

    let elsewhere = thread::spawn(move || affinity.is_current()).join().unwrap();
    assert!(!elsewhere);
}

// ── invoke_on_ui_thread ──────────────────────────────────────────

#[test]
fn invoke_from_other_thread_runs_on_ui_thread() {
    let bridge = WorkerBridge::spawn();
    let (tx, rx) = mpsc::channel();

    let probe = bridge.clone();
    bridge.invoke_on_ui_thread(Box::new(move || {
        tx.send(probe.is_ui_thread()).unwrap();
    }));

    assert!(rx.recv().unwrap());
}

#[test]
fn invoke_on_ui_thread_is_inline_when_already_there() {
    let bridge = InlineBridge { storage: None };
    let ran = Arc::new(Mutex::new(false));

    let flag = ran.clone();
    bridge.invoke_on_ui_thread(Box::new(move || *flag.lock().unwrap() = true));

    assert!(*ran.lock().unwrap());
}

#[test]
fn invocations_keep_submission_order() {
    let bridge = WorkerBridge::spawn();
    let (tx, rx) = mpsc::channel();

    for i in 0..10 {
        let tx = tx.clone();
        bridge.invoke_on_ui_thread(Box::new(move || tx.send(i).unwrap()));
    }
    drop(tx);

    let seen: Vec<i32> = rx.iter().collect();
    assert_eq!(seen, (0..10).collect::<Vec<_>>());
}

// ── Config & storage ─────────────────────────────────────────────

#[test]
fn default_bridge_services() {
    let bridge = WorkerBridge::spawn();
    assert_eq!(bridge.get_config_setting("AppName"), None);
    assert!(bridge.storage_area().unwrap().is_none());
}

#[test]
fn overridden_bridge_services() {
    let bridge = InlineBridge {
        storage: Some(Arc::new(MemoryStorage::new())),
    };
    assert_eq!(bridge.get_config_setting("AppName").as_deref(), Some("demo"));
    let storage = bridge.storage_area().unwrap().unwrap();
    assert_eq!(storage.describe(), "in-memory storage");
}
