use clap::{ArgAction, Parser};

const HELP_TEMPLATE: &'static str = r#"
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
"#;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about=None, disable_help_flag=true, help_template=HELP_TEMPLATE)]
pub struct Cli {
    #[arg(
        short = 'b',
        long = "bits",
        help = "Sets the key universe size in bits",
        value_name = "BITS",
        default_value_t = 16
    )]
    pub bits: u32,

    #[arg(
        short = 'r',
        long = "radix",
        help = "Sets the number of key bits consumed per tree level",
        value_name = "RADIX",
        default_value_t = 4
    )]
    pub radix: u32,

    #[arg(
        short = 'k',
        long = "keys",
        help = "Sets the number of keys inserted before the lookup race",
        value_name = "COUNT",
        default_value_t = 30_000
    )]
    pub keys: usize,

    #[arg(
        short = 'l',
        long = "lookups",
        help = "Sets the number of lookups per worker thread",
        value_name = "COUNT",
        default_value_t = 60_000
    )]
    pub lookups: usize,

    #[arg(
        short = 'p',
        long = "threads",
        help = "Sets the number of worker threads",
        value_name = "COUNT",
        default_value_t = 4
    )]
    pub threads: usize,

    #[arg(
        short = 't',
        long = "runs",
        help = "Sets the number of times the entire test should be run",
        value_name = "RUNS",
        default_value_t = 1
    )]
    pub runs: usize,

    #[arg(
        short = 'i',
        long = "variant",
        help = "Sets the tree variant to drive",
        value_name = "NAME",
        default_value = "sequential"
    )]
    pub variant: String,

    #[arg(
        short = 'j',
        long = "json",
        help = "Sets output type to JSON",
        default_value_t = false
    )]
    pub json: bool,

    #[arg(long, help="Print help information", action=ArgAction::Help)]
    pub help: Option<bool>,
}
