use clap::{Parser, Subcommand, ValueEnum};
use sheetset::{Context, Policy, SheetSetConfig, SheetSetError, SheetSetStore, Template, TemplateField};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "sheetset", version, about)]
struct Cli {
    /// Print debug output (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a template without evaluating it
    Check {
        template: String,
        #[arg(long, default_value = "extended")]
        policy: String,
    },
    /// Validate and evaluate a template
    Eval {
        template: String,
        /// A variable binding, given as name=value
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_binding)]
        vars: Vec<(String, String)>,
        #[arg(long, default_value = "extended")]
        policy: String,
    },
    /// Preview a stored template of a sheet group
    Preview {
        config: PathBuf,
        sheet_group: String,
        #[arg(long, value_enum)]
        field: Option<FieldArg>,
    },
    /// Print the planned views and sheets
    Plan {
        config: PathBuf,
        /// Plan only this sheet group
        sheet_group: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FieldArg {
    ViewName,
    SheetNumber,
    SheetName,
}

impl From<FieldArg> for TemplateField {
    fn from(field: FieldArg) -> Self {
        match field {
            FieldArg::ViewName => TemplateField::ViewName,
            FieldArg::SheetNumber => TemplateField::SheetNumber,
            FieldArg::SheetName => TemplateField::SheetName,
        }
    }
}

fn parse_binding(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))
}

fn preset(name: &str) -> Result<Policy, SheetSetError> {
    Policy::preset(name).ok_or_else(|| SheetSetError::UnknownPreset(name.to_string()))
}

fn run(command: Command) -> Result<(), SheetSetError> {
    match command {
        Command::Check { template, policy } => {
            let template = Template::compile(&template, &preset(&policy)?)?;
            let variables = template.expression().variables();
            if variables.is_empty() {
                println!("ok");
            } else {
                println!("ok (uses {})", variables.join(", "));
            }
        }
        Command::Eval { template, vars, policy } => {
            let template = Template::compile(&template, &preset(&policy)?)?;
            let context: Context = vars.into_iter().collect();
            println!("{}", template.render(&context)?);
        }
        Command::Preview { config, sheet_group, field } => {
            let config = SheetSetConfig::load_from_file(config)?;
            let policy = config.policy()?;
            let fields = match field {
                Some(field) => vec![field.into()],
                None => TemplateField::ALL.to_vec(),
            };
            for field in fields {
                let preview = config.preview_sheet_group(&sheet_group, field, &policy)?;
                println!("{}: {}", field, preview.display_text());
            }
        }
        Command::Plan { config, sheet_group } => {
            let config = SheetSetConfig::load_from_file(config)?;
            let policy = config.policy()?;
            let names = match &sheet_group {
                Some(name) => vec![name.as_str()],
                None => config.sheet_group_names(),
            };
            for name in names {
                println!("{}", name);
                for sheet in config.plan_sheet_group(name, &policy)? {
                    println!(
                        "  [{}] {} | {} | {}",
                        sheet.counters.sheet, sheet.view_name, sheet.sheet_number, sheet.sheet_name
                    );
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
