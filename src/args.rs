use clap::{Parser, Subcommand};
use std::path::PathBuf;

use snomed_tools::{
    NormalizeMode,
    constants::{
        DEFAULT_AUTHORING_BASE_URL, DEFAULT_USER_AGENT, DEFAULT_VALIDATE_URL, SNOMED_CT_SYSTEM,
        TARGET_CODE_COLUMN,
    },
};

#[derive(Debug, Parser)]
#[command(name = "snomed_tools")]
#[command(about = "Deconstruct, strip and validate SNOMED CT expression files (TSV)")]
pub struct Args {
    /// Log per-row events only, without a progress bar.
    #[arg(long, global = true, default_value_t = false)]
    pub no_progress: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand each row's target code into Concept_* and Group_* columns.
    Deconstruct(DeconstructArgs),
    /// Add a normalized Post_Coordinated_Expression_Stripped column.
    Strip(StripArgs),
    /// Validate every expression and add a Validation_Result column.
    Validate(ValidateArgs),
    /// Validate a single code and print the server response.
    Lookup(LookupArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct HttpArgs {
    /// Overall per-request timeout. Omit to keep the client default.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DeconstructArgs {
    /// Input TSV with a header row.
    pub input: PathBuf,

    /// Output path. Defaults to <input>_processed.tsv.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Column holding the code to look up.
    #[arg(long, default_value = TARGET_CODE_COLUMN)]
    pub target_column: String,

    /// Authoring-form base URL; requests go to <base>/<code>/authoring-form.
    #[arg(long, default_value = DEFAULT_AUTHORING_BASE_URL)]
    pub authoring_base_url: String,

    /// Verify TLS certificates for the authoring-form server. Off by default
    /// so self-signed test servers work.
    #[arg(long, default_value_t = false)]
    pub verify_authoring_tls: bool,

    #[command(flatten)]
    pub http: HttpArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StripArgs {
    /// Input TSV with a Post_Coordinated_Expression column.
    pub input: PathBuf,

    /// Output path. Defaults to <input>_stripped.tsv.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = NormalizeMode::Strict)]
    pub mode: NormalizeMode,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Input TSV with an expression column.
    pub input: PathBuf,

    /// Output path. Defaults to <input>_validated.tsv.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Expression column. Defaults to Post_Coordinated_Expression_Stripped
    /// when present, else Post_Coordinated_Expression.
    #[arg(long)]
    pub column: Option<String>,

    #[command(flatten)]
    pub endpoint: EndpointArgs,

    #[command(flatten)]
    pub http: HttpArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct LookupArgs {
    /// Code or expression to validate.
    pub code: String,

    #[command(flatten)]
    pub endpoint: EndpointArgs,

    #[command(flatten)]
    pub http: HttpArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct EndpointArgs {
    /// CodeSystem $validate-code endpoint.
    #[arg(long, default_value = DEFAULT_VALIDATE_URL)]
    pub validate_url: String,

    /// Code system URI sent as both `url` and `system`.
    #[arg(long, default_value = SNOMED_CT_SYSTEM)]
    pub code_system: String,
}
