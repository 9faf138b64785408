//! Single-file builds with whatever compiler is installed
//!
//! The builder never fails because a compiler is missing: an absent source
//! file, an unsupported extension and an empty candidate list are all
//! reported as a [`BuildOutcome`] so the caller can print them and exit
//! cleanly.

pub mod compilers;

use std::path::{Path, PathBuf};

use crate::error::UfetchError;
use crate::exec::subprocess::display_command;
use crate::exec::{CommandResult, ProcessRunner, ToolLocator};
use crate::utils::terminal::{print_info, print_verbose};

pub use compilers::Compiler;

/// A source file selected for compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileTarget {
    pub source_path: PathBuf,
    /// Extension without the dot, empty when the file has none
    pub extension: String,
}

impl CompileTarget {
    /// Target for an existing regular file, `None` otherwise
    pub fn new(source_path: &Path) -> Option<Self> {
        if !source_path.is_file() {
            return None;
        }

        let extension = source_path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();

        Some(Self {
            source_path: source_path.to_path_buf(),
            extension,
        })
    }

    /// Source path without its extension
    pub fn output_path(&self) -> PathBuf {
        self.source_path.with_extension("")
    }
}

/// The compiler picked for a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerChoice {
    pub executable_name: &'static str,
    /// Where the locator found it
    pub executable_path: PathBuf,
    pub compiler: Compiler,
}

impl CompilerChoice {
    /// Argument list for this compiler
    pub fn invocation(&self, source: &Path, output: &Path) -> Vec<String> {
        self.compiler.build_args(source, output)
    }
}

/// What a build attempt ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The path does not name a regular file
    SourceMissing(PathBuf),
    /// Nothing in the compiler table handles this extension
    UnsupportedExtension(String),
    /// Known extension, but no candidate is installed
    NoCompiler {
        extension: String,
        candidates: Vec<&'static str>,
    },
    /// The compiler ran; its status is relayed as-is
    Finished {
        compiler: &'static str,
        result: CommandResult,
    },
}

/// Pick the first candidate the locator can find
pub fn select_compiler(
    candidates: &'static [Compiler],
    locator: &impl ToolLocator,
) -> Option<CompilerChoice> {
    candidates.iter().find_map(|compiler| {
        locator.locate(compiler.name).map(|path| CompilerChoice {
            executable_name: compiler.name,
            executable_path: path,
            compiler: *compiler,
        })
    })
}

/// Compiles single source files
pub struct Builder<L, R> {
    locator: L,
    runner: R,
    verbose: bool,
}

impl<L: ToolLocator, R: ProcessRunner> Builder<L, R> {
    pub fn new(locator: L, runner: R, verbose: bool) -> Self {
        Self {
            locator,
            runner,
            verbose,
        }
    }

    /// Compile `file_path` with the first installed compiler for its extension
    pub fn build(&mut self, file_path: &Path) -> Result<BuildOutcome, UfetchError> {
        let Some(target) = CompileTarget::new(file_path) else {
            return Ok(BuildOutcome::SourceMissing(file_path.to_path_buf()));
        };

        let Some(candidates) = compilers::candidates_for(&target.extension) else {
            return Ok(BuildOutcome::UnsupportedExtension(target.extension));
        };

        let Some(choice) = select_compiler(candidates, &self.locator) else {
            return Ok(BuildOutcome::NoCompiler {
                extension: target.extension,
                candidates: candidates.iter().map(|c| c.name).collect(),
            });
        };

        print_info(&format!("Using compiler: {}", choice.executable_name));
        print_verbose(
            self.verbose,
            &format!("Found at {}", choice.executable_path.display()),
        );

        let args = choice.invocation(&target.source_path, &target.output_path());
        println!("Running: {}", display_command(choice.executable_name, &args));

        let result = self.runner.run(choice.executable_name, &args)?;
        print_verbose(
            self.verbose,
            &format!("Finished in {:.2}s", result.duration.as_secs_f64()),
        );

        Ok(BuildOutcome::Finished {
            compiler: choice.executable_name,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Pretends only the listed programs are installed
    struct FakeLocator(HashSet<&'static str>);

    impl FakeLocator {
        fn with(names: &[&'static str]) -> Self {
            Self(names.iter().copied().collect())
        }
    }

    impl ToolLocator for FakeLocator {
        fn locate(&self, program: &str) -> Option<PathBuf> {
            self.0
                .contains(program)
                .then(|| PathBuf::from("/usr/bin").join(program))
        }
    }

    /// Records invocations instead of running them
    #[derive(Default)]
    struct RecordingRunner {
        calls: Vec<(String, Vec<String>)>,
        exit_code: i32,
    }

    impl ProcessRunner for &mut RecordingRunner {
        fn run(&mut self, program: &str, args: &[String]) -> Result<CommandResult, UfetchError> {
            self.calls.push((program.to_string(), args.to_vec()));
            Ok(CommandResult {
                success: self.exit_code == 0,
                exit_code: Some(self.exit_code),
                duration: Duration::from_millis(1),
            })
        }
    }

    fn source_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, "int main(void) { return 0; }\n").unwrap();
        path
    }

    #[test]
    fn test_first_available_candidate_wins() {
        let temp_dir = TempDir::new().unwrap();
        let source = source_file(&temp_dir, "main.c");
        let mut runner = RecordingRunner::default();

        let outcome = Builder::new(FakeLocator::with(&["clang", "gcc"]), &mut runner, false)
            .build(&source)
            .unwrap();

        match outcome {
            BuildOutcome::Finished { compiler, .. } => assert_eq!(compiler, "gcc"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(runner.calls.len(), 1);
        assert_eq!(runner.calls[0].0, "gcc");
    }

    #[test]
    fn test_earlier_candidate_wins_for_every_extension() {
        let temp_dir = TempDir::new().unwrap();

        for lang in compilers::LANGUAGES {
            let every_candidate: Vec<&'static str> = lang.candidates.iter().map(|c| c.name).collect();

            for ext in lang.extensions {
                let source = source_file(&temp_dir, &format!("main.{}", ext));
                let mut runner = RecordingRunner::default();

                let outcome = Builder::new(FakeLocator::with(&every_candidate), &mut runner, false)
                    .build(&source)
                    .unwrap();

                match outcome {
                    BuildOutcome::Finished { compiler, .. } => {
                        assert_eq!(compiler, lang.candidates[0].name, ".{}", ext)
                    }
                    other => panic!(".{}: unexpected outcome: {:?}", ext, other),
                }
                assert_eq!(runner.calls.len(), 1, ".{}", ext);
                assert_eq!(runner.calls[0].0, lang.candidates[0].name, ".{}", ext);
            }
        }
    }

    #[test]
    fn test_fallback_compiler_invocation() {
        let temp_dir = TempDir::new().unwrap();
        let source = source_file(&temp_dir, "main.c");
        let mut runner = RecordingRunner::default();

        Builder::new(FakeLocator::with(&["clang"]), &mut runner, false)
            .build(&source)
            .unwrap();

        let expected_out = temp_dir.path().join("main");
        assert_eq!(
            runner.calls,
            vec![(
                "clang".to_string(),
                vec![
                    source.to_string_lossy().into_owned(),
                    "-o".to_string(),
                    expected_out.to_string_lossy().into_owned(),
                ]
            )]
        );
    }

    #[test]
    fn test_relative_path_matches_plain_invocation() {
        let target = CompileTarget {
            source_path: PathBuf::from("main.c"),
            extension: "c".to_string(),
        };
        let choice = select_compiler(
            compilers::candidates_for("c").unwrap(),
            &FakeLocator::with(&["clang"]),
        )
        .unwrap();

        assert_eq!(
            choice.invocation(&target.source_path, &target.output_path()),
            ["main.c", "-o", "main"]
        );
    }

    #[test]
    fn test_missing_file_runs_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.c");
        let mut runner = RecordingRunner::default();

        let outcome = Builder::new(FakeLocator::with(&["gcc"]), &mut runner, false)
            .build(&missing)
            .unwrap();

        assert_eq!(outcome, BuildOutcome::SourceMissing(missing));
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_directory_is_not_a_source_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("src.c");
        std::fs::create_dir(&dir).unwrap();
        let mut runner = RecordingRunner::default();

        let outcome = Builder::new(FakeLocator::with(&["gcc"]), &mut runner, false)
            .build(&dir)
            .unwrap();

        assert!(matches!(outcome, BuildOutcome::SourceMissing(_)));
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_unsupported_extension_runs_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let source = source_file(&temp_dir, "notes.txt");
        let mut runner = RecordingRunner::default();

        let outcome = Builder::new(FakeLocator::with(&["gcc"]), &mut runner, false)
            .build(&source)
            .unwrap();

        assert_eq!(outcome, BuildOutcome::UnsupportedExtension("txt".to_string()));
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_no_installed_candidate_runs_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let source = source_file(&temp_dir, "app.go");
        let mut runner = RecordingRunner::default();

        let outcome = Builder::new(FakeLocator::with(&["gcc"]), &mut runner, false)
            .build(&source)
            .unwrap();

        assert_eq!(
            outcome,
            BuildOutcome::NoCompiler {
                extension: "go".to_string(),
                candidates: vec!["go"],
            }
        );
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_non_zero_exit_is_relayed() {
        let temp_dir = TempDir::new().unwrap();
        let source = source_file(&temp_dir, "main.rs");
        let mut runner = RecordingRunner {
            exit_code: 101,
            ..Default::default()
        };

        let outcome = Builder::new(FakeLocator::with(&["rustc"]), &mut runner, false)
            .build(&source)
            .unwrap();

        match outcome {
            BuildOutcome::Finished { result, .. } => {
                assert!(!result.success);
                assert_eq!(result.exit_code, Some(101));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
