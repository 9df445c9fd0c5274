//! Command-line front end for the capability catalogue

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use toolcatalog::categories::{CategoryFilter, CategorySort};
use toolcatalog::config::CatalogConfig;
use toolcatalog::discovery::{SearchCriteria, SortBy, SortOrder};
use toolcatalog::startup::{init_logging, Catalog, StartupLogger};
use toolcatalog::{CatalogError, Category, OperationContext, Result};

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version)]
struct Cli {
    /// Capability file or directory
    #[arg(short = 'd', long, default_value = toolcatalog::DEFAULT_CAPABILITIES_DIR)]
    capabilities: PathBuf,

    /// Configuration file
    #[arg(short, long, default_value = toolcatalog::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level (overrides the config file)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Relevance,
    Name,
    Category,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

#[derive(Clone, Copy, ValueEnum)]
enum CategorySortArg {
    Relevance,
    Priority,
    ToolCount,
    Name,
}

#[derive(Subcommand)]
enum Commands {
    /// List capabilities, optionally in one category
    List {
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Show one capability
    Get { name: String },
    /// List populated categories
    Categories,
    /// Search capabilities
    Search {
        #[arg(default_value = "")]
        query: String,
        /// Restrict to a category (repeatable)
        #[arg(long = "category")]
        categories: Vec<Category>,
        #[arg(long, default_value_t = 0.0)]
        min_relevance: f64,
        #[arg(long, default_value_t = 0)]
        max_results: usize,
        #[arg(long, value_enum, default_value_t = SortArg::Relevance)]
        sort_by: SortArg,
        #[arg(long, value_enum)]
        order: Option<OrderArg>,
    },
    /// Overview of a category, or of all categories
    Discover {
        #[arg(default_value = "")]
        category: String,
    },
    /// Suggest capabilities for a task description
    Recommend {
        text: String,
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },
    /// Browse categories
    BrowseCategories {
        #[arg(long, default_value = "")]
        keyword: String,
        #[arg(long, default_value = "")]
        use_case: String,
        #[arg(long)]
        include_empty: bool,
        #[arg(long, value_enum, default_value_t = CategorySortArg::Relevance)]
        sort_by: CategorySortArg,
        #[arg(long, default_value_t = 0)]
        max_results: usize,
    },
    /// Rank categories for a task description
    SuggestCategories {
        query: String,
        #[arg(long, default_value_t = 0)]
        max: usize,
    },
    /// Describe a category in prose
    Describe {
        category: String,
        #[arg(long)]
        no_tools: bool,
    },
    /// Validate JSON arguments against a capability's input schema
    Validate { name: String, input: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CatalogConfig::load(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    let dispatch = init_logging(&config.logging)?;

    let ctx = OperationContext::background();
    let catalog = Catalog::builder()
        .logger(dispatch)
        .config(config)
        .load_path(&cli.capabilities)?
        .build(&ctx)?;
    StartupLogger::display_startup_info(Some(&cli.config), &catalog.stats(), toolcatalog::VERSION);

    match cli.command {
        Commands::List { category } => {
            print_json(&catalog.registry().list_by_category_name(&ctx, &category)?)
        }
        Commands::Get { name } => print_json(&catalog.registry().get(&ctx, &name)?),
        Commands::Categories => print_json(&catalog.registry().categories(&ctx)?),
        Commands::Search {
            query,
            categories,
            min_relevance,
            max_results,
            sort_by,
            order,
        } => {
            let sort_by = match sort_by {
                SortArg::Relevance => SortBy::Relevance,
                SortArg::Name => SortBy::Name,
                SortArg::Category => SortBy::Category,
            };
            let order = order.map(|o| match o {
                OrderArg::Asc => SortOrder::Asc,
                OrderArg::Desc => SortOrder::Desc,
            });
            let criteria = SearchCriteria::query(query)
                .with_categories(categories)
                .with_min_relevance(min_relevance)
                .with_max_results(max_results)
                .sorted_by(sort_by, order);
            print_json(&catalog.discovery().search(&ctx, &criteria)?)
        }
        Commands::Discover { category } => {
            print_json(&catalog.discovery().discover_by_category_name(&ctx, &category)?)
        }
        Commands::Recommend { text, limit } => print_json(&catalog.discovery().recommend(&ctx, &text, limit)?),
        Commands::BrowseCategories {
            keyword,
            use_case,
            include_empty,
            sort_by,
            max_results,
        } => {
            let filter = CategoryFilter {
                keyword,
                use_case,
                include_empty,
                sort_by: match sort_by {
                    CategorySortArg::Relevance => CategorySort::Relevance,
                    CategorySortArg::Priority => CategorySort::Priority,
                    CategorySortArg::ToolCount => CategorySort::ToolCount,
                    CategorySortArg::Name => CategorySort::Name,
                },
                max_results,
            };
            print_json(&catalog.categories().discover(&ctx, &filter)?)
        }
        Commands::SuggestCategories { query, max } => {
            print_json(&catalog.categories().recommend(&ctx, &query, max)?)
        }
        Commands::Describe { category, no_tools } => {
            println!("{}", catalog.categories().describe(&ctx, &category, !no_tools)?);
            Ok(())
        }
        Commands::Validate { name, input } => {
            let input: serde_json::Value = serde_json::from_str(&input)?;
            match catalog.registry().validate_input(&ctx, &name, &input) {
                Ok(()) => {
                    println!("valid");
                    Ok(())
                }
                Err(CatalogError::InvalidInput { error, .. }) => {
                    print_json(&error)?;
                    std::process::exit(2);
                }
                Err(e) => Err(e),
            }
        }
    }
}
