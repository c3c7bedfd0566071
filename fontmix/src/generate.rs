//! Running a full mix: every letter, then the font
//!
//! Letters are processed one at a time. Progress is reported through a
//! callback (or a channel, when running on a worker thread) and a cancel
//! flag is checked between letters.

use std::{
    collections::BTreeMap,
    fmt,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver},
        Arc,
    },
    thread::{self, JoinHandle},
};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    assemble::assemble_font,
    config::{CutMethod, MixConfig},
    contour::{Contour, LETTERS},
    error::GenerateError,
    extract::{GlyphSource, SourceFont},
    mix::{mix_letter, CutMode, LetterSettings},
};

/// Random cuts are drawn from this range, away from the glyph edges.
pub const RANDOM_CUT_RANGE: std::ops::Range<f64> = 0.2..0.8;
/// The custom cut used when none are configured.
pub const DEFAULT_CUT: f64 = 0.5;

/// A progress notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub percent: u8,
    pub message: String,
}

impl Progress {
    fn new(percent: u8, message: impl Into<String>) -> Self {
        Progress {
            percent,
            message: message.into(),
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>3}% {}", self.percent, self.message)
    }
}

/// The result of a successful run.
#[derive(Clone, Debug, PartialEq)]
pub struct Generated {
    /// Final contours for every letter; blank letters have no contours.
    pub letters: BTreeMap<char, Vec<Contour>>,
    pub output_path: PathBuf,
    /// `true` if the font could not be written to the requested path.
    pub used_alternate: bool,
}

/// Picks the cut fractions for each letter.
#[derive(Clone, Debug)]
pub struct CutPlanner {
    method: CutMethod,
    count: usize,
    columns: bool,
    h_cuts: Vec<f64>,
    v_cuts: Vec<f64>,
    rng: StdRng,
}

impl CutPlanner {
    /// Plan cuts for `num_sources` sources, i.e. `num_sources - 1` cuts per axis.
    pub fn new(config: &MixConfig, num_sources: usize) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        CutPlanner {
            method: config.cut_method,
            count: num_sources.saturating_sub(1),
            columns: config.vertical_cuts,
            h_cuts: config.h_cuts.clone(),
            v_cuts: config.v_cuts.clone(),
            rng,
        }
    }

    /// Row and column cut fractions for the next letter.
    ///
    /// Random cuts are redrawn on every call; the other methods return the
    /// same cuts every time. Without vertical cuts enabled the column list
    /// is empty.
    pub fn next_letter(&mut self) -> (Vec<f64>, Vec<f64>) {
        match self.method {
            CutMethod::Random => {
                let h_cuts = self.random_cuts();
                let v_cuts = if self.columns {
                    self.random_cuts()
                } else {
                    Vec::new()
                };
                (h_cuts, v_cuts)
            }
            CutMethod::Equidistant => {
                let k = self.count + 1;
                let cuts: Vec<f64> = (1..k).map(|i| i as f64 / k as f64).collect();
                let v_cuts = if self.columns {
                    cuts.clone()
                } else {
                    Vec::new()
                };
                (cuts, v_cuts)
            }
            CutMethod::Custom => {
                let h_cuts = if self.h_cuts.is_empty() {
                    vec![DEFAULT_CUT; self.count]
                } else {
                    self.h_cuts.iter().copied().take(self.count).collect()
                };
                // without configured column cuts the grid stays one column wide
                let v_cuts = if self.columns {
                    self.v_cuts.iter().copied().take(self.count).collect()
                } else {
                    Vec::new()
                };
                (h_cuts, v_cuts)
            }
        }
    }

    fn random_cuts(&mut self) -> Vec<f64> {
        let mut cuts: Vec<f64> = (0..self.count)
            .map(|_| self.rng.gen_range(RANDOM_CUT_RANGE))
            .collect();
        cuts.sort_by(f64::total_cmp);
        cuts
    }
}

/// Runs the mixing pipeline described by a [`MixConfig`].
#[derive(Clone, Debug)]
pub struct Generator {
    config: MixConfig,
    sources: Vec<SourceFont>,
}

impl Generator {
    pub fn new(config: MixConfig) -> Self {
        let sources = config.sources.iter().map(SourceFont::from_path).collect();
        Generator { config, sources }
    }

    /// Use these sources instead of the paths in the configuration.
    pub fn with_sources(mut self, sources: Vec<SourceFont>) -> Self {
        self.sources = sources;
        self
    }

    pub fn config(&self) -> &MixConfig {
        &self.config
    }

    /// Mix every letter and write the font.
    ///
    /// Fails before writing anything if fewer than two sources can be read.
    /// Individual letters never fail; a letter no source can provide is
    /// left blank.
    pub fn run(
        &self,
        progress: &mut impl FnMut(Progress),
        cancel: &AtomicBool,
    ) -> Result<Generated, GenerateError> {
        if self.sources.len() < 2 {
            return Err(GenerateError::Precondition(format!(
                "at least 2 source fonts are needed, got {}",
                self.sources.len()
            )));
        }
        let config = &self.config;
        config.validate_options()?;

        progress(Progress::new(5, "Initializing"));
        let sources = self.usable_sources();
        if sources.len() < 2 {
            return Err(GenerateError::Precondition(format!(
                "only {} of {} source fonts are usable",
                sources.len(),
                self.sources.len()
            )));
        }

        let mut planner = CutPlanner::new(config, sources.len());
        let mode = if config.vertical_cuts {
            CutMode::Checkerboard
        } else {
            CutMode::Horizontal
        };
        let mut letters = BTreeMap::new();
        for (i, letter) in LETTERS.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                log::info!("cancelled before '{letter}'");
                return Err(GenerateError::Cancelled);
            }
            let percent = 5 + (85 * i / LETTERS.len()) as u8;
            progress(Progress::new(percent, format!("Mixing {letter}")));

            let (h_cuts, v_cuts) = planner.next_letter();
            log::debug!("'{letter}': h_cuts {h_cuts:?}, v_cuts {v_cuts:?}, {mode:?}");
            let settings = LetterSettings {
                h_cuts,
                v_cuts,
                normalize: config.normalize,
                mode,
                empty_union: config.empty_union,
            };
            let outcome = mix_letter(&sources, &letter.to_string(), &settings);
            if let Some(reason) = outcome.empty_reason() {
                log::warn!("'{letter}' is blank: {reason}");
            }
            letters.insert(*letter, outcome.into_contours());
        }

        progress(Progress::new(90, "Building font"));
        let saved = assemble_font(&letters, &config.output_path(), &config.family_name)?;
        progress(Progress::new(100, "Done"));
        Ok(Generated {
            letters,
            output_path: saved.path,
            used_alternate: saved.used_alternate,
        })
    }

    fn usable_sources(&self) -> Vec<SourceFont> {
        self.sources
            .iter()
            .filter(|source| match source.outline_format() {
                Ok(format) => {
                    log::debug!("{}: {format:?} outlines", source.label());
                    true
                }
                Err(reason) => {
                    log::warn!("ignoring {}: {reason}", source.label());
                    false
                }
            })
            .cloned()
            .collect()
    }

    /// Run on a dedicated worker thread.
    pub fn spawn(self) -> GeneratorHandle {
        let (sender, receiver) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let worker = thread::spawn(move || {
            // the receiver may be dropped early; progress is best effort
            let mut report = |progress| {
                let _ = sender.send(progress);
            };
            self.run(&mut report, &flag)
        });
        GeneratorHandle {
            progress: receiver,
            cancel,
            worker,
        }
    }
}

/// A run in progress on a worker thread.
pub struct GeneratorHandle {
    progress: Receiver<Progress>,
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<Result<Generated, GenerateError>>,
}

impl GeneratorHandle {
    /// Progress notifications; the channel closes when the run ends.
    pub fn progress(&self) -> &Receiver<Progress> {
        &self.progress
    }

    /// Ask the run to stop before the next letter.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Wait for the run to finish.
    pub fn join(self) -> Result<Generated, GenerateError> {
        self.worker.join().unwrap_or(Err(GenerateError::Worker))
    }
}
