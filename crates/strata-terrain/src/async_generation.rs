//! Asynchronous tile generation with a configurable thread pool.
//!
//! Tiles are independent of each other, so synthesis can be offloaded to
//! background threads. Tasks are keyed by their grid position, can be
//! cancelled, and completed tiles are delivered via bounded channels.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;

use crate::environment::Environment;
use crate::error::TerrainError;
use crate::noise::NoiseGenerator;
use crate::tile::{Tile, TileOptions};

/// Position of a tile in a grid of equally sized tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub x: i64,
    pub z: i64,
}

impl TileKey {
    pub fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }

    /// `base` moved so that this tile's samples continue where its
    /// neighbour's end.
    pub fn options(&self, base: &TileOptions) -> TileOptions {
        TileOptions {
            offset_x: base.offset_x + self.x as f64 * base.width as f64 * base.stride_x,
            offset_z: base.offset_z + self.z as f64 * base.depth as f64 * base.stride_z,
            ..*base
        }
    }
}

/// A request to synthesize a single tile.
#[derive(Clone)]
pub struct TileTask {
    pub key: TileKey,
    pub options: TileOptions,
    pub environment: Arc<Environment>,
    pub noise: Arc<dyn NoiseGenerator>,
}

impl fmt::Debug for TileTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileTask")
            .field("key", &self.key)
            .field("options", &self.options)
            .field("environment", &self.environment.name())
            .finish_non_exhaustive()
    }
}

/// A finished tile, or the reason it could not be built.
#[derive(Debug)]
pub struct GeneratedTile {
    /// The key matching the original task.
    pub key: TileKey,
    pub tile: Result<Tile, TerrainError>,
    /// Generation time in microseconds (for profiling).
    pub generation_time_us: u64,
}

/// Internal wrapper that carries the task and its cancellation flag.
struct QueuedTask {
    task: TileTask,
    cancelled: Arc<AtomicBool>,
}

/// Manages asynchronous tile generation across a thread pool.
pub struct AsyncTileGenerator {
    task_sender: Sender<QueuedTask>,
    result_receiver: Receiver<GeneratedTile>,
    /// Shared cancellation flag per task.
    active_tasks: Arc<DashMap<TileKey, Arc<AtomicBool>>>,
    /// Tasks queued or executing.
    in_flight: Arc<AtomicU64>,
}

impl AsyncTileGenerator {
    /// Create a new async generator with the specified thread count and queue capacity.
    ///
    /// # Arguments
    /// - `thread_count`: Number of worker threads.
    /// - `max_concurrent`: Maximum in-flight tasks. Excess submissions are rejected.
    /// - `result_capacity`: Bounded channel capacity for completed tiles.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::WorkerSpawn`] if a worker thread cannot be started.
    pub fn new(
        thread_count: usize,
        max_concurrent: usize,
        result_capacity: usize,
    ) -> Result<Self, TerrainError> {
        let (task_sender, task_receiver) = bounded::<QueuedTask>(max_concurrent * 2);
        let (result_sender, result_receiver) = bounded::<GeneratedTile>(result_capacity);
        let in_flight = Arc::new(AtomicU64::new(0));

        for _ in 0..thread_count {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);

            std::thread::Builder::new()
                .name("tile-gen-worker".into())
                .spawn(move || {
                    while let Ok(queued) = receiver.recv() {
                        if queued.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let start = std::time::Instant::now();
                        let tile = generate_tile_sync(&queued.task);
                        let elapsed = start.elapsed().as_micros() as u64;

                        if !queued.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(GeneratedTile {
                                key: queued.task.key,
                                tile,
                                generation_time_us: elapsed,
                            });
                        }

                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })
                .map_err(TerrainError::WorkerSpawn)?;
        }

        tracing::debug!(thread_count, max_concurrent, "Started tile generation pool");

        Ok(Self {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
        })
    }

    /// Create a generator with a thread count based on CPU cores.
    pub fn with_defaults() -> Result<Self, TerrainError> {
        let cpus = num_cpus::get().max(2);
        let threads = (cpus - 1).max(1);
        Self::new(threads, 64, 128)
    }

    /// Submit a tile for background generation.
    ///
    /// Returns `Ok(())` if the task was queued, or `Err(task)` if the queue is full.
    #[allow(clippy::result_large_err)]
    pub fn submit(&self, task: TileTask) -> Result<(), TileTask> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.active_tasks.insert(task.key, Arc::clone(&cancelled));
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        self.task_sender
            .try_send(QueuedTask { task, cancelled })
            .map_err(|e| {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                let task = e.into_inner().task;
                self.active_tasks.remove(&task.key);
                task
            })
    }

    /// Cancel a pending or in-progress generation task.
    ///
    /// If the task has already completed, this is a no-op.
    pub fn cancel(&self, key: &TileKey) {
        if let Some((_, cancelled)) = self.active_tasks.remove(key) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Drain all completed tiles from the result channel.
    pub fn drain_results(&self) -> Vec<GeneratedTile> {
        let mut results = Vec::new();
        while let Ok(generated) = self.result_receiver.try_recv() {
            self.active_tasks.remove(&generated.key);
            results.push(generated);
        }
        results
    }

    /// Number of tasks currently in flight (queued or executing).
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if a task for the given key is currently pending.
    pub fn is_pending(&self, key: &TileKey) -> bool {
        self.active_tasks.contains_key(key)
    }
}

/// Generate a tile synchronously. This is what runs on worker threads.
pub fn generate_tile_sync(task: &TileTask) -> Result<Tile, TerrainError> {
    Tile::generate(
        task.options,
        Arc::clone(&task.environment),
        Arc::clone(&task.noise),
    )
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::environment::TerrainLayer;
    use crate::noise::OctaveNoise;

    fn dummy_task(key: TileKey) -> TileTask {
        let base = TileOptions {
            width: 16,
            depth: 16,
            ..TileOptions::default()
        };
        TileTask {
            key,
            options: key.options(&base),
            environment: Arc::new(
                Environment::builder("hills")
                    .layer(TerrainLayer::new(0.0, 0.5, 4.0, 1.0, 1.0))
                    .layer(TerrainLayer::new(0.5, 1.0, 12.0, 1.0, 2.0))
                    .build()
                    .unwrap(),
            ),
            noise: Arc::new(OctaveNoise::from_seed(42)),
        }
    }

    fn drain_until(generator: &AsyncTileGenerator, expected: usize) -> Vec<GeneratedTile> {
        let mut results = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(30);
        while results.len() < expected && Instant::now() < deadline {
            results.extend(generator.drain_results());
            if results.len() < expected {
                std::thread::sleep(Duration::from_millis(10));
            }
        }
        results
    }

    #[test]
    fn test_key_offsets_follow_tile_size() {
        let base = TileOptions {
            width: 32,
            depth: 16,
            offset_x: 1.0,
            stride_x: 0.5,
            ..TileOptions::default()
        };
        let moved = TileKey::new(2, -1).options(&base);
        assert_eq!(moved.offset_x, 1.0 + 2.0 * 32.0 * 0.5);
        assert_eq!(moved.offset_z, -16.0);
        assert_eq!((moved.width, moved.depth), (32, 16));
    }

    #[test]
    fn test_concurrent_generation_is_safe() {
        let generator = AsyncTileGenerator::new(4, 32, 64).unwrap();

        let mut submitted = 0;
        for x in 0..4_i64 {
            for z in 0..4_i64 {
                if generator.submit(dummy_task(TileKey::new(x, z))).is_ok() {
                    submitted += 1;
                }
            }
        }

        let results = drain_until(&generator, submitted);
        assert_eq!(
            results.len(),
            submitted,
            "Should receive all submitted tiles: got {}/{submitted}",
            results.len()
        );
        for generated in &results {
            assert!(generated.tile.is_ok(), "tile {:?} failed", generated.key);
        }
    }

    #[test]
    fn test_background_tile_matches_sync() {
        let generator = AsyncTileGenerator::new(1, 8, 8).unwrap();
        let task = dummy_task(TileKey::new(3, 1));
        let expected = generate_tile_sync(&task).unwrap();
        generator.submit(task).unwrap();

        let results = drain_until(&generator, 1);
        assert_eq!(results.len(), 1);
        let tile = results.into_iter().next().unwrap().tile.unwrap();
        assert_eq!(tile.heights(), expected.heights());
        assert_eq!(tile.colors(), expected.colors());
    }

    #[test]
    fn test_invalid_options_reported_per_tile() {
        let generator = AsyncTileGenerator::new(1, 8, 8).unwrap();
        let mut task = dummy_task(TileKey::new(0, 0));
        task.options.width = 0;
        generator.submit(task).unwrap();

        let results = drain_until(&generator, 1);
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].tile,
            Err(TerrainError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_cancellation_stops_generation() {
        let generator = AsyncTileGenerator::new(2, 64, 64).unwrap();

        let key = TileKey::new(50, 50);
        let _ = generator.submit(dummy_task(key));
        generator.cancel(&key);
        assert!(!generator.is_pending(&key));

        // The task may have completed before cancellation; either outcome is fine.
        std::thread::sleep(Duration::from_millis(200));
        let _ = generator.drain_results();
    }

    #[test]
    fn test_in_flight_count() {
        let generator = AsyncTileGenerator::new(1, 64, 64).unwrap();

        assert_eq!(generator.in_flight_count(), 0);

        for i in 0..5_i64 {
            let _ = generator.submit(dummy_task(TileKey::new(i, 0)));
        }

        let deadline = Instant::now() + Duration::from_secs(10);
        while generator.in_flight_count() > 0 && Instant::now() < deadline {
            let _ = generator.drain_results();
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(generator.in_flight_count(), 0, "all tasks should finish");
    }
}
