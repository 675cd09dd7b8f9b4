use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use xqfront::ast::Module;
use xqfront::{
    CompileError, Diagnostic, FilesystemSourceProvider, ModuleManager, ParserConfig,
    SourceProvider,
};

#[derive(Serialize)]
struct Report<'a> {
    module: Option<&'a Module>,
    diagnostics: Vec<DiagnosticView>,
}

#[derive(Serialize)]
struct DiagnosticView {
    code: &'static str,
    severity: String,
    line: usize,
    column: usize,
    message: String,
}

impl DiagnosticView {
    fn new(d: &Diagnostic, source: &str) -> Self {
        let location = d.location(source);
        Self {
            code: d.code.as_str(),
            severity: d.severity.to_string(),
            line: location.line,
            column: location.col,
            message: d.message.clone(),
        }
    }
}

/// Parses an XQuery main module and reports its diagnostics.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print the syntax tree and diagnostics as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Treat full-text keywords as ordinary names
    #[arg(long, default_value_t = false)]
    no_full_text: bool,

    /// Treat update keywords as ordinary names
    #[arg(long, default_value_t = false)]
    no_update: bool,

    /// Treat scripting keywords as ordinary names
    #[arg(long, default_value_t = false)]
    no_scripting: bool,

    /// Main module to parse; relative imports resolve from its directory
    query: PathBuf,
}

impl Args {
    fn config(&self) -> ParserConfig {
        ParserConfig::default()
            .with_full_text(!self.no_full_text)
            .with_update(!self.no_update)
            .with_scripting(!self.no_scripting)
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    let path = args.query.as_path();
    let root = path.parent().unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let provider = Arc::new(FilesystemSourceProvider::new(root));
    let source = match provider.load(&file_name) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };
    let manager = ModuleManager::with_config(provider, args.config());

    let (module, diagnostics, failed) = match manager.compile_main(&source, Some(file_name.as_str())) {
        Ok(parsed) => {
            let failed = !parsed.is_ok();
            (Some(parsed), Vec::new(), failed)
        }
        Err(CompileError::Parse(e)) => {
            let mut all = e.recorded.clone();
            all.push(e.diagnostic.clone());
            (None, all, true)
        }
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };
    let diagnostics: Vec<DiagnosticView> = module
        .as_ref()
        .map(|m| m.diagnostics.as_slice())
        .unwrap_or(&diagnostics)
        .iter()
        .map(|d| DiagnosticView::new(d, &source))
        .collect();

    if args.json {
        let report = Report {
            module: module.as_ref().map(|m| &m.module),
            diagnostics,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::from(2);
            }
        }
    } else {
        for d in &diagnostics {
            println!(
                "{}:{}:{}: {} [{}] {}",
                file_name, d.line, d.column, d.severity, d.code, d.message
            );
        }
        if !failed {
            println!("{}: ok", file_name);
        }
    }

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
