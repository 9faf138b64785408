//! Extension to compiler lookup table
//!
//! Each source extension maps to an ordered list of compilers. Native
//! compilers come first; alternative toolchains for the same language are
//! only reached when nothing earlier is installed.

use std::path::Path;

/// How a compiler expects its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgStyle {
    /// `<src> -o <out>` (gcc, clang, rustc)
    SourceThenOutput,
    /// `build-exe <src>`, output named after the source
    ZigBuildExe,
    /// `build -o <out> <src>`
    GoBuild,
    /// `<src>` only; output is produced next to the source (tsc, javac, python)
    SourceOnly,
    /// `--onefile <src>`
    PyInstallerOneFile,
    /// `-o <out>.luac <src>`
    LuaBytecode,
}

/// A compiler executable and its calling convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compiler {
    pub name: &'static str,
    pub style: ArgStyle,
}

impl Compiler {
    const fn new(name: &'static str, style: ArgStyle) -> Self {
        Self { name, style }
    }

    /// Arguments for compiling `source` into `output`
    pub fn build_args(&self, source: &Path, output: &Path) -> Vec<String> {
        let src = source.to_string_lossy().into_owned();
        let out = output.to_string_lossy().into_owned();

        match self.style {
            ArgStyle::SourceThenOutput => vec![src, "-o".to_string(), out],
            ArgStyle::ZigBuildExe => vec!["build-exe".to_string(), src],
            ArgStyle::GoBuild => vec!["build".to_string(), "-o".to_string(), out, src],
            ArgStyle::SourceOnly => vec![src],
            ArgStyle::PyInstallerOneFile => vec!["--onefile".to_string(), src],
            ArgStyle::LuaBytecode => vec!["-o".to_string(), format!("{}.luac", out), src],
        }
    }
}

/// Ordered compiler candidates for a group of extensions
#[derive(Debug)]
pub struct LanguageEntry {
    /// Extensions without the leading dot
    pub extensions: &'static [&'static str],
    pub candidates: &'static [Compiler],
}

const GCC: Compiler = Compiler::new("gcc", ArgStyle::SourceThenOutput);
const CLANG: Compiler = Compiler::new("clang", ArgStyle::SourceThenOutput);
const GXX: Compiler = Compiler::new("g++", ArgStyle::SourceThenOutput);
const CLANGXX: Compiler = Compiler::new("clang++", ArgStyle::SourceThenOutput);
const ZIG: Compiler = Compiler::new("zig", ArgStyle::ZigBuildExe);
const RUSTC: Compiler = Compiler::new("rustc", ArgStyle::SourceThenOutput);
const GO: Compiler = Compiler::new("go", ArgStyle::GoBuild);
const TSC: Compiler = Compiler::new("tsc", ArgStyle::SourceOnly);
const PYTHON: Compiler = Compiler::new("python", ArgStyle::SourceOnly);
const PYINSTALLER: Compiler = Compiler::new("pyinstaller", ArgStyle::PyInstallerOneFile);
const LUAC: Compiler = Compiler::new("luac", ArgStyle::LuaBytecode);
const JAVAC: Compiler = Compiler::new("javac", ArgStyle::SourceOnly);

/// Supported languages, in no particular order
pub static LANGUAGES: &[LanguageEntry] = &[
    LanguageEntry { extensions: &["c"], candidates: &[GCC, CLANG] },
    LanguageEntry { extensions: &["cpp", "cc"], candidates: &[GXX, CLANGXX] },
    LanguageEntry { extensions: &["zig"], candidates: &[ZIG] },
    LanguageEntry { extensions: &["rs"], candidates: &[RUSTC] },
    LanguageEntry { extensions: &["go"], candidates: &[GO] },
    LanguageEntry { extensions: &["ts"], candidates: &[TSC] },
    LanguageEntry { extensions: &["py"], candidates: &[PYTHON, PYINSTALLER] },
    LanguageEntry { extensions: &["lua"], candidates: &[LUAC] },
    LanguageEntry { extensions: &["java"], candidates: &[JAVAC] },
];

/// Ordered candidates for an extension (without the dot), if supported
pub fn candidates_for(extension: &str) -> Option<&'static [Compiler]> {
    LANGUAGES
        .iter()
        .find(|lang| lang.extensions.contains(&extension))
        .map(|lang| lang.candidates)
}
