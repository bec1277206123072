//! Pipeline stages: read → parse
//!
//! ```text
//! reader thread ──bounded channel──▶ N parse workers (rayon) ──▶ DashMap
//! ```
//!
//! The reader stops at the first I/O failure; workers keep the first fatal
//! parse error. Both stages poll the cancellation token between files.

use std::sync::Arc;

use crossbeam_channel::bounded;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::cancel::CancellationToken;
use crate::config::ParallelConfig;
use crate::errors::{Result, SsaGraphError};
use crate::features::filesystem::FileSystem;
use crate::features::frontend::{FrontendRegistry, ParsedUnit};
use crate::shared::ports::Language;

/// A file read from the project, waiting for its parser
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub language: Language,
    pub source: String,
}

/// Parsed units keyed by path
pub type ParsedUnits = DashMap<String, ParsedUnit>;

/// Read `files` on a dedicated thread and parse them on `parallel.workers`
/// rayon workers
pub fn read_and_parse(
    fs: &Arc<dyn FileSystem>,
    files: Vec<(String, Language)>,
    frontends: &FrontendRegistry,
    parallel: &ParallelConfig,
    token: &CancellationToken,
) -> Result<ParsedUnits> {
    let workers = parallel.effective_workers();
    let capacity = parallel.channel_capacity.max(1);
    let total = files.len();
    info!(files = total, workers, capacity, "reading and parsing sources");

    let (tx, rx) = bounded::<SourceFile>(capacity);
    let parsed: ParsedUnits = DashMap::with_capacity(total);
    let failure: Mutex<Option<SsaGraphError>> = Mutex::new(None);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("ssagraph-parse-{}", i))
        .build()
        .map_err(|e| SsaGraphError::pipeline(format!("failed to start parse workers: {}", e)))?;

    let read_result = std::thread::scope(|scope| {
        let reader = scope.spawn(|| -> Result<()> {
            for (path, language) in files {
                token.check()?;
                let source = fs.read_file(&path)?;
                debug!(path = %path, bytes = source.len(), "read source");
                if tx
                    .send(SourceFile {
                        path,
                        language,
                        source,
                    })
                    .is_err()
                {
                    // Every worker is gone; they recorded why
                    break;
                }
            }
            drop(tx);
            Ok(())
        });

        // Workers own every receiver, so the reader sees a closed channel
        // once they all stop
        let receivers: Vec<_> = (0..workers).map(|_| rx.clone()).collect();
        drop(rx);
        pool.scope(|s| {
            for rx in receivers {
                let parsed = &parsed;
                let failure = &failure;
                s.spawn(move |_| {
                    for file in rx.iter() {
                        if token.is_cancelled() || failure.lock().is_some() {
                            break;
                        }
                        match parse_file(frontends, &file) {
                            Ok(unit) => {
                                parsed.insert(file.path, unit);
                            }
                            Err(error) => {
                                warn!(path = %file.path, error = %error, "parse failed");
                                failure.lock().get_or_insert(error);
                                break;
                            }
                        }
                    }
                });
            }
        });

        reader
            .join()
            .map_err(|_| SsaGraphError::pipeline("reader thread panicked"))?
    });

    token.check()?;
    if let Some(error) = failure.into_inner() {
        return Err(error);
    }
    read_result?;

    info!(parsed = parsed.len(), "parse stage finished");
    Ok(parsed)
}

fn parse_file(frontends: &FrontendRegistry, file: &SourceFile) -> Result<ParsedUnit> {
    let frontend = frontends.require(file.language)?;
    let unit = frontend.parse(&file.path, &file.source)?;
    if unit.has_errors() {
        debug!(path = %file.path, "tree contains syntax errors");
    }
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::filesystem::MemoryFileSystem;

    fn memory_fs(files: &[(&str, &str)]) -> Arc<dyn FileSystem> {
        let mut fs = MemoryFileSystem::new();
        for (path, content) in files {
            fs.insert(path, *content);
        }
        Arc::new(fs)
    }

    #[test]
    fn test_parses_every_file() {
        let fs = memory_fs(&[("a.js", "let a = 1;"), ("b.c", "int b;")]);
        let files = vec![
            ("a.js".to_string(), Language::JavaScript),
            ("b.c".to_string(), Language::C),
        ];
        let parsed = read_and_parse(
            &fs,
            files,
            &FrontendRegistry::with_defaults(),
            &ParallelConfig::from_preset(crate::config::Preset::Fast),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed.contains_key("b.c"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let fs = memory_fs(&[]);
        let files = vec![("gone.js".to_string(), Language::JavaScript)];
        let result = read_and_parse(
            &fs,
            files,
            &FrontendRegistry::with_defaults(),
            &ParallelConfig::from_preset(crate::config::Preset::Lenient),
            &CancellationToken::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cancelled_before_start() {
        let fs = memory_fs(&[("a.js", "1;")]);
        let token = CancellationToken::new();
        token.cancel();
        let result = read_and_parse(
            &fs,
            vec![("a.js".to_string(), Language::JavaScript)],
            &FrontendRegistry::with_defaults(),
            &ParallelConfig::from_preset(crate::config::Preset::Lenient),
            &token,
        );
        assert!(matches!(result, Err(SsaGraphError::Cancelled)));
    }
}
