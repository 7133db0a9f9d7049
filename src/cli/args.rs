use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "recordview",
    version,
    about = "fetch, query and render JSON record collections",
    long_about = "recordview loads record collections from a json-server style REST backend (or a static JSON document), applies search and sort, and renders them as HTML tables or card grids. Records are soft deleted and restored through partial updates.\n\nExamples:\n  recordview list posts\n  recordview list posts --search áo --sort views:desc:numeric\n  recordview create posts -f title=Áo -f views=10\n  recordview delete posts 1\n  recordview document https://example.com/db.json --sort priceAsc\n\nTip: Use --config to keep the backend URL and resource layouts out of the command line."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "color",
        global = true,
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored status lines."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        global = true,
        help_heading = "Output",
        help = "Write the rendered markup to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.recordview/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'b',
        long = "base-url",
        visible_alias = "api-url",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "Base URL of the REST backend (default http://localhost:3000)."
    )]
    pub base_url: Option<String>,

    #[arg(
        short = 'p',
        long = "proxy",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "Route requests through a proxy."
    )]
    pub proxy: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load a resource and render it.
    List {
        resource: String,
        #[arg(short = 's', long = "search", value_name = "KEYWORD")]
        search: Option<String>,
        #[arg(long = "sort", value_name = "FIELD[:asc|desc[:text|numeric]]")]
        sort: Option<String>,
    },
    /// Load a resource and render the records matching a keyword.
    Search {
        resource: String,
        keyword: String,
        #[arg(long = "sort", value_name = "FIELD[:asc|desc[:text|numeric]]")]
        sort: Option<String>,
    },
    /// Create a record; the id is assigned as one past the largest numeric id.
    Create {
        resource: String,
        #[arg(short = 'f', long = "field", value_name = "KEY=VALUE", action = ArgAction::Append)]
        fields: Vec<String>,
    },
    /// Change fields of an existing record.
    Edit {
        resource: String,
        id: String,
        #[arg(short = 'f', long = "field", value_name = "KEY=VALUE", action = ArgAction::Append)]
        fields: Vec<String>,
    },
    /// Mark a record as deleted.
    Delete { resource: String, id: String },
    /// Clear the deleted mark of a record.
    Restore { resource: String, id: String },
    /// Load several resources at once and render them one after another.
    Dashboard {
        #[arg(value_name = "RESOURCE", default_values = ["posts", "comments"])]
        resources: Vec<String>,
    },
    /// Fetch a static JSON document and render its records.
    Document {
        #[arg(value_name = "URL")]
        url: Option<String>,
        #[arg(long = "as", value_name = "RESOURCE", default_value = "products")]
        resource: String,
        #[arg(
            short = 'k',
            long = "keys",
            value_name = "KEYS",
            help = "Comma-separated keys that may hold the record array, in priority order."
        )]
        keys: Option<String>,
        #[arg(short = 's', long = "search", value_name = "KEYWORD")]
        search: Option<String>,
        #[arg(long = "sort", value_name = "FIELD[:asc|desc[:text|numeric]]")]
        sort: Option<String>,
    },
    /// Write a commented default config file.
    InitConfig,
}
