//! dumpcheck CLI

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use dumpcheck::error::report_error;
use dumpcheck::{CheckPlan, CompilationUnitId, DumpPolicy, FlatNaming, Resolver, Verifier};

#[derive(Parser)]
#[command(name = "dumpcheck", version, about = "Ordered line checks against JIT IR dumps")]
struct Cli {
    /// Log dump resolution, loading and every passed check
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a TOML check plan against its dump
    Verify {
        /// Check plan file
        plan: PathBuf,
        /// Directory the JIT wrote its dumps to
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// Print a JSON summary instead of a report
        #[arg(long)]
        json: bool,
    },
    /// Print the dump path of a compilation unit
    Resolve {
        /// Binary name of the owning type, e.g. `pkg.Outer$Inner`
        #[arg(long)]
        owner: String,
        #[arg(long)]
        method: String,
        /// Parameter descriptor (repeat for each parameter)
        #[arg(long = "param")]
        params: Vec<String>,
        /// Return descriptor
        #[arg(long, default_value = "V")]
        returns: String,
        /// Name the optimized dump
        #[arg(long)]
        optimized: bool,
        /// Use flat naming with this separator instead of signature naming
        #[arg(long, conflicts_with = "optimized")]
        flat: Option<char>,
        /// canonical, first-written, most-recent or ordinal:<n>
        #[arg(long, default_value = "canonical")]
        policy: DumpPolicy,
        /// Directory the JIT wrote its dumps to
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// List every candidate dump instead of the chosen one
        #[arg(long)]
        all: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Verify { plan, dir, json } => verify_plan(&plan, &dir, json),
        Command::Resolve {
            owner,
            method,
            params,
            returns,
            optimized,
            flat,
            policy,
            dir,
            all,
        } => {
            let unit = params
                .iter()
                .fold(CompilationUnitId::new(owner, method), |unit, param| {
                    unit.param_descriptor(param.as_str())
                })
                .returns_descriptor(returns);
            let resolver = match flat {
                Some(separator) => Resolver::new(dir).with_scheme(FlatNaming::new(separator, ".ll")),
                None => Resolver::new(dir).optimized(optimized),
            }
            .with_policy(policy);
            resolve_unit(&resolver, &unit, all)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("dumpcheck=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dumpcheck=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Returns whether every check passed
fn verify_plan(plan_path: &Path, dir: &Path, json: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let plan = CheckPlan::load(plan_path)?;
    let checks = plan.compile_checks()?;
    let resolver = plan.resolver(dir)?;
    let mut verifier = Verifier::open_with(&resolver, &plan.unit())?.with_options(plan.verify_options());

    let outcome = verifier.run_all(&checks);

    if json {
        println!("{}", serde_json::to_string_pretty(&verifier.summary())?);
        return Ok(outcome.is_ok());
    }

    match outcome {
        Ok(matches) => {
            println!(
                "✓ {} checks passed against {}",
                matches.len(),
                verifier.document().name()
            );
            Ok(true)
        }
        Err(e) => {
            report_error(verifier.document(), &e)?;
            Ok(false)
        }
    }
}

fn resolve_unit(resolver: &Resolver, unit: &CompilationUnitId, all: bool) -> Result<bool, Box<dyn std::error::Error>> {
    if !all {
        println!("{}", resolver.locate(unit).display());
        return Ok(true);
    }

    let candidates = resolver.candidates(unit);
    for candidate in &candidates {
        match candidate.ordinal {
            Some(n) => println!("{}\t#{n}", candidate.path.display()),
            None => println!("{}", candidate.path.display()),
        }
    }
    Ok(!candidates.is_empty())
}
