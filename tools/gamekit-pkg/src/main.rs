///
/// gamekit CLI - Game package tooling
///
/// Provides commands for inspecting and preparing game packages:
/// - gamekit init <dir>: Create a package with a populated manifest
/// - gamekit info [dir]: Show identity and resource counts
/// - gamekit imports <file>: List resolved import records of a script
/// - gamekit sanitize / unsanitize <file>: Print masked or restored source
///

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;

use gamekit_pkg::{
    find_package_root, init_package, parse_imports, parse_imports_strict, sanitize, unsanitize,
    ImportKind, ImportRecord, LayoutConfig, Package, PackageError, PackagePaths, PopulateOptions,
};

#[derive(Parser)]
#[command(name = "gamekit")]
#[command(author, version, about = "Game package tooling", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new package
    Init {
        /// Package directory
        dir: PathBuf,

        /// Short name used as the package id
        #[arg(long)]
        short_name: Option<String>,

        /// Display title
        #[arg(long)]
        title: Option<String>,
    },

    /// Show package identity and contents
    Info {
        /// Package directory (defaults to the enclosing package)
        dir: Option<PathBuf>,

        /// Layout config (TOML) overriding file extensions
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the import records of a script
    Imports {
        /// Script file
        file: PathBuf,

        /// Dotted module path used for relative imports
        #[arg(long)]
        base: Option<String>,

        /// Also report import lines that fail to parse
        #[arg(long)]
        strict: bool,
    },

    /// Print a script with directives and imports masked
    Sanitize {
        file: PathBuf,
    },

    /// Print a masked script restored to its original form
    Unsanitize {
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let result = match cli.command {
        Commands::Init { dir, short_name, title } => init(&dir, short_name, title),
        Commands::Info { dir, config } => info(dir.as_deref(), config.as_deref()),
        Commands::Imports { file, base, strict } => imports(&file, base, strict),
        Commands::Sanitize { file } => transform(&file, sanitize),
        Commands::Unsanitize { file } => transform(&file, unsanitize),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init(dir: &Path, short_name: Option<String>, title: Option<String>) -> Result<(), PackageError> {
    let package = init_package(dir, &PopulateOptions { short_name, title })?;
    println!("Created package '{}' in {}", package.id(), dir.display());
    Ok(())
}

fn info(dir: Option<&Path>, config: Option<&Path>) -> Result<(), PackageError> {
    let start = dir.unwrap_or(Path::new("."));
    let root = find_package_root(start).ok_or_else(|| PackageError::NotAPackage {
        path: start.to_path_buf(),
    })?;

    let layout = match config {
        Some(path) => LayoutConfig::from_path(path)?,
        None => LayoutConfig::default(),
    };
    let package = Package::from_paths(PackagePaths::new(&root)?, layout)?;
    let manifest = package.manifest();

    println!("id:        {}", package.id());
    println!("appID:     {}", manifest.app_id);
    if let Some(title) = &manifest.title {
        println!("title:     {}", title);
    }
    println!("scripts:   {}", package.scripts()?.len());
    println!("images:    {}", package.images()?.len());
    println!("sounds:    {}", package.sounds()?.len());
    println!("icons:     {}", package.icons()?.len());
    println!("languages: {}", package.languages()?.join(", "));
    Ok(())
}

fn imports(file: &Path, base: Option<String>, strict: bool) -> Result<(), PackageError> {
    let base = match base {
        Some(base) => base,
        None => file
            .parent()
            .and_then(find_package_root)
            .map(|root| Package::open(&root))
            .transpose()?
            .map(|package| package.script_module_path(file))
            .unwrap_or_default(),
    };

    let code = std::fs::read_to_string(file).map_err(PackageError::io(file))?;

    if strict {
        let parsed = parse_imports_strict(&code, &base);
        parsed.records.iter().for_each(print_record);
        for unmatched in &parsed.unmatched {
            eprintln!("{}:{}: unmatched: {}", file.display(), unmatched.line, unmatched.text);
        }
    } else {
        parse_imports(&code, &base).iter().for_each(print_record);
    }
    Ok(())
}

fn print_record(record: &ImportRecord) {
    let kind = match record.kind {
        ImportKind::Import => "import",
        ImportKind::From => "from",
    };
    println!(
        "{:<6} {} (package {}, as {})",
        kind, record.resolved_path, record.package, record.alias
    );
}

fn transform(file: &Path, f: fn(&str) -> String) -> Result<(), PackageError> {
    let code = std::fs::read_to_string(file).map_err(PackageError::io(file))?;
    print!("{}", f(&code));
    Ok(())
}
