//! Asset preloading
//!
//! Session start waits until every sprite and sound reports ready. Loaders
//! signal completion through a [`LoadSignal`]; the [`LoadBarrier`] blocks on
//! the channel (no polling) until the Nth ready signal, a failure, or the
//! deadline.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Sound,
}

/// A named resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetId {
    pub name: String,
    pub kind: AssetKind,
}

impl AssetId {
    pub fn image(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AssetKind::Image,
        }
    }

    pub fn sound(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AssetKind::Sound,
        }
    }

    /// Relative location: `img/<name>.png` or `sounds/<name>.mp3`
    pub fn path(&self) -> PathBuf {
        match self.kind {
            AssetKind::Image => PathBuf::from("img").join(format!("{}.png", self.name)),
            AssetKind::Sound => PathBuf::from("sounds").join(format!("{}.mp3", self.name)),
        }
    }
}

/// Everything a session needs before it can start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    pub assets: Vec<AssetId>,
}

impl AssetManifest {
    /// Background, ball, paddle and block sprites plus the bump sound
    pub fn standard() -> Self {
        Self {
            assets: vec![
                AssetId::image("background"),
                AssetId::image("ball"),
                AssetId::image("platform"),
                AssetId::image("block"),
                AssetId::sound("bump"),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[derive(Debug)]
enum LoadMessage {
    Ready(String),
    Failed { name: String, reason: String },
}

/// Completion handle given to loaders
#[derive(Debug, Clone)]
pub struct LoadSignal {
    tx: Sender<LoadMessage>,
}

impl LoadSignal {
    pub fn ready(&self, name: &str) {
        // The barrier may already have given up; nothing to report to
        let _ = self.tx.send(LoadMessage::Ready(name.to_string()));
    }

    pub fn failed(&self, name: &str, reason: impl Into<String>) {
        let _ = self.tx.send(LoadMessage::Failed {
            name: name.to_string(),
            reason: reason.into(),
        });
    }
}

/// Counted-completion barrier: N resources, N ready signals
#[derive(Debug)]
pub struct LoadBarrier {
    rx: Receiver<LoadMessage>,
    required: usize,
    loaded: usize,
}

impl LoadBarrier {
    pub fn new(required: usize) -> (Self, LoadSignal) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                rx,
                required,
                loaded: 0,
            },
            LoadSignal { tx },
        )
    }

    /// Block until all resources are ready or `timeout` elapses
    pub fn wait(mut self, timeout: Duration) -> Result<usize> {
        let start = Instant::now();
        let deadline = start + timeout;

        while self.loaded < self.required {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(LoadMessage::Ready(name)) => {
                    self.loaded += 1;
                    log::debug!("Asset `{name}` ready ({}/{})", self.loaded, self.required);
                }
                Ok(LoadMessage::Failed { name, reason }) => {
                    log::warn!("Asset `{name}` failed: {reason}");
                    return Err(EngineError::AssetFailed { name, reason });
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!(
                        "Asset preload timed out with {}/{} ready",
                        self.loaded,
                        self.required
                    );
                    return Err(EngineError::AssetTimeout {
                        loaded: self.loaded,
                        required: self.required,
                        waited: start.elapsed(),
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(EngineError::AssetFailed {
                        name: "manifest".to_string(),
                        reason: format!(
                            "every loader finished with only {}/{} ready",
                            self.loaded, self.required
                        ),
                    });
                }
            }
        }
        Ok(self.loaded)
    }
}

/// Source of sprites and sounds. `load` must not block; report through
/// the signal whenever the asset is usable.
pub trait AssetLoader {
    fn load(&self, asset: &AssetId, signal: LoadSignal);
}

/// Load the whole manifest and wait for it
pub fn preload(
    loader: &dyn AssetLoader,
    manifest: &AssetManifest,
    timeout: Duration,
) -> Result<()> {
    let (barrier, signal) = LoadBarrier::new(manifest.len());
    for asset in &manifest.assets {
        loader.load(asset, signal.clone());
    }
    drop(signal);

    let loaded = barrier.wait(timeout)?;
    log::info!("All {loaded} assets ready");
    Ok(())
}

/// Reads assets from disk under a root directory, one worker thread each
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for DirectoryLoader {
    fn load(&self, asset: &AssetId, signal: LoadSignal) {
        let path = self.root.join(asset.path());
        let name = asset.name.clone();
        std::thread::spawn(move || match std::fs::read(&path) {
            Ok(bytes) => {
                log::debug!("Read {} ({} bytes)", path.display(), bytes.len());
                signal.ready(&name);
            }
            Err(e) => signal.failed(&name, format!("{}: {e}", path.display())),
        });
    }
}

/// Assets synthesized in-process (text sprites, terminal bell); ready at once
#[derive(Debug, Clone, Copy, Default)]
pub struct ProceduralLoader;

impl AssetLoader for ProceduralLoader {
    fn load(&self, asset: &AssetId, signal: LoadSignal) {
        signal.ready(&asset.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverLoader;

    impl AssetLoader for NeverLoader {
        fn load(&self, _asset: &AssetId, signal: LoadSignal) {
            // Hold the signal open without ever reporting
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(500));
                drop(signal);
            });
        }
    }

    #[test]
    fn test_manifest_paths() {
        let manifest = AssetManifest::standard();
        assert_eq!(manifest.len(), 5);
        assert_eq!(AssetId::image("ball").path(), PathBuf::from("img/ball.png"));
        assert_eq!(AssetId::sound("bump").path(), PathBuf::from("sounds/bump.mp3"));
    }

    #[test]
    fn test_barrier_releases_on_last_signal() {
        let (barrier, signal) = LoadBarrier::new(3);
        let handles: Vec<_> = (0..3)
            .map(|i| {
                let signal = signal.clone();
                std::thread::spawn(move || signal.ready(&format!("asset{i}")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(barrier.wait(Duration::from_secs(5)).unwrap(), 3);
    }

    #[test]
    fn test_barrier_with_nothing_to_load() {
        let (barrier, _signal) = LoadBarrier::new(0);
        assert_eq!(barrier.wait(Duration::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_barrier_times_out() {
        let (barrier, signal) = LoadBarrier::new(2);
        signal.ready("background");
        let err = barrier.wait(Duration::from_millis(20)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::AssetTimeout {
                loaded: 1,
                required: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_failure_aborts_wait() {
        let (barrier, signal) = LoadBarrier::new(2);
        signal.failed("bump", "decoder error");
        let err = barrier.wait(Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, EngineError::AssetFailed { ref name, .. } if name == "bump"));
    }

    #[test]
    fn test_procedural_preload() {
        let manifest = AssetManifest::standard();
        assert!(preload(&ProceduralLoader, &manifest, Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_preload_timeout() {
        let err = preload(&NeverLoader, &AssetManifest::standard(), Duration::from_millis(30))
            .unwrap_err();
        assert!(matches!(err, EngineError::AssetTimeout { loaded: 0, required: 5, .. }));
    }

    #[test]
    fn test_directory_loader() {
        let root = std::env::temp_dir()
            .join(format!("brick-breaker-assets-{}", std::process::id()));
        std::fs::create_dir_all(root.join("img")).unwrap();
        std::fs::create_dir_all(root.join("sounds")).unwrap();
        let manifest = AssetManifest::standard();
        for asset in &manifest.assets {
            std::fs::write(root.join(asset.path()), b"data").unwrap();
        }

        let loader = DirectoryLoader::new(&root);
        assert!(preload(&loader, &manifest, Duration::from_secs(5)).is_ok());

        std::fs::remove_file(root.join("sounds/bump.mp3")).unwrap();
        let err = preload(&loader, &manifest, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, EngineError::AssetFailed { ref name, .. } if name == "bump"));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
