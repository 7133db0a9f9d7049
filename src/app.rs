use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use futures::future::join_all;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{CliArgs, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile, DEFAULT_BASE_URL};
use crate::controller::{Page, ResourceSpec};
use crate::error::Failure;
use crate::query::SortSpec;
use crate::remote::{extract, HttpTransport, RemoteClient};

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub base_url: String,
    pub document_url: Option<String>,
    pub collection_keys: Vec<String>,
    pub proxy: Option<String>,
    pub output: Option<PathBuf>,
    pub no_color: bool,
    pub verbose: u8,
    pub config_path: Option<PathBuf>,
    pub resources: HashMap<String, ResourceSpec>,
    pub command: Command,
}

#[derive(Clone, Debug, Default)]
pub struct Outcome {
    pub markup: String,
    pub notice: Option<String>,
    pub load_failed: Option<Failure>,
}

fn format_kv_line(label: &str, value: &str) -> String {
    format!(":: {:<10}: {}", label, value)
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let base_url = args
        .base_url
        .or_else(|| cfg.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let proxy = args.proxy.or_else(|| cfg.proxy.clone());
    let output = args
        .output
        .or_else(|| cfg.output.clone())
        .map(|p| config::expand_tilde(&p));
    let collection_keys = cfg.collection_keys.clone().unwrap_or_else(|| {
        extract::DEFAULT_COLLECTION_KEYS
            .iter()
            .map(|k| k.to_string())
            .collect()
    });

    Ok(RunConfig {
        base_url,
        document_url: cfg.document_url.clone(),
        collection_keys,
        proxy,
        output,
        no_color,
        verbose: args.verbose,
        config_path: args.config.map(|p| config::expand_tilde(&p)),
        resources: cfg.resources(),
        command: args.command,
    })
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_sort(raw: Option<&str>) -> Result<Option<SortSpec>, String> {
    raw.map(|r| SortSpec::parse(r).map_err(|e| format!("invalid --sort '{r}': {e}")))
        .transpose()
}

async fn derive_and_render(
    page: &Page,
    resource: &str,
    loaded: Result<usize, Failure>,
    keyword: Option<&str>,
    sort: Option<SortSpec>,
) -> Outcome {
    let total = page.snapshot(resource).await.len();
    if loaded.is_ok() {
        if let Some(keyword) = keyword {
            page.search(resource, keyword).await;
        }
        if let Some(sort) = sort {
            page.sort(resource, sort).await;
        }
    }
    let shown = page.view(resource).await.filtered.len();
    let mut markup = page.render(resource).await;
    if loaded.is_ok() {
        markup.push_str(&crate::render::render_count(shown, total));
        markup.push('\n');
    }
    Outcome {
        markup,
        notice: loaded
            .as_ref()
            .ok()
            .map(|_| format_kv_line("Results", &format!("{shown} / {total}"))),
        load_failed: loaded.err(),
    }
}

async fn load_for_mutation(page: &Page, resource: &str) -> Result<(), String> {
    page.load(resource)
        .await
        .map(|_| ())
        .map_err(|e| format!("failed to load {resource}: {e}"))
}

pub async fn execute(page: &Page, run: &RunConfig) -> Result<Outcome, String> {
    match &run.command {
        Command::List {
            resource,
            search,
            sort,
        } => {
            let sort = parse_sort(sort.as_deref())?;
            let loaded = page.load(resource).await;
            Ok(derive_and_render(page, resource, loaded, search.as_deref(), sort).await)
        }
        Command::Search {
            resource,
            keyword,
            sort,
        } => {
            let sort = parse_sort(sort.as_deref())?;
            let loaded = page.load(resource).await;
            Ok(derive_and_render(page, resource, loaded, Some(keyword.as_str()), sort).await)
        }
        Command::Create { resource, fields } => {
            let fields = crate::utils::parse_field_assignments(fields)?;
            load_for_mutation(page, resource).await?;
            let created = page
                .create(resource, fields)
                .await
                .map_err(|e| format!("create failed: {e}"))?;
            Ok(Outcome {
                markup: page.render(resource).await,
                notice: Some(format_kv_line(
                    "Created",
                    &format!("{resource} '{}'", created.id()),
                )),
                load_failed: page.last_error(resource).await,
            })
        }
        Command::Edit {
            resource,
            id,
            fields,
        } => {
            let fields = crate::utils::parse_field_assignments(fields)?;
            load_for_mutation(page, resource).await?;
            page.update(resource, id, fields)
                .await
                .map_err(|e| format!("edit failed: {e}"))?;
            Ok(Outcome {
                markup: page.render(resource).await,
                notice: Some(format_kv_line("Updated", &format!("{resource} '{id}'"))),
                load_failed: page.last_error(resource).await,
            })
        }
        Command::Delete { resource, id } => {
            load_for_mutation(page, resource).await?;
            page.soft_delete(resource, id)
                .await
                .map_err(|e| format!("delete failed: {e}"))?;
            Ok(Outcome {
                markup: page.render(resource).await,
                notice: Some(format_kv_line("Deleted", &format!("{resource} '{id}'"))),
                load_failed: page.last_error(resource).await,
            })
        }
        Command::Restore { resource, id } => {
            load_for_mutation(page, resource).await?;
            page.restore(resource, id)
                .await
                .map_err(|e| format!("restore failed: {e}"))?;
            Ok(Outcome {
                markup: page.render(resource).await,
                notice: Some(format_kv_line("Restored", &format!("{resource} '{id}'"))),
                load_failed: page.last_error(resource).await,
            })
        }
        Command::Dashboard { resources } => {
            let loads = join_all(resources.iter().map(|r| page.load(r))).await;
            let mut outcome = Outcome::default();
            let mut loaded_count = 0;
            for (resource, loaded) in resources.iter().zip(loads) {
                match loaded {
                    Ok(_) => loaded_count += 1,
                    Err(e) => {
                        if outcome.load_failed.is_none() {
                            outcome.load_failed = Some(e);
                        }
                    }
                }
                outcome.markup.push_str(&format!(
                    "<section id=\"{}\">\n{}</section>\n",
                    crate::render::escape_html(resource),
                    page.render(resource).await
                ));
            }
            outcome.notice = Some(format_kv_line(
                "Loaded",
                &format!("{loaded_count} / {}", resources.len()),
            ));
            Ok(outcome)
        }
        Command::Document {
            url,
            resource,
            search,
            sort,
            ..
        } => {
            let sort = parse_sort(sort.as_deref())?;
            let url = url
                .clone()
                .or_else(|| run.document_url.clone())
                .ok_or_else(|| "no document URL given (argument or document_url in config)".to_string())?;
            let loaded = page.load_document(resource, &url).await;
            Ok(derive_and_render(page, resource, loaded, search.as_deref(), sort).await)
        }
        Command::InitConfig => Err("init-config does not render a view".to_string()),
    }
}

async fn emit(output: Option<&Path>, markup: &str) -> Result<(), String> {
    match output {
        Some(path) => tokio::fs::write(path, markup)
            .await
            .map_err(|e| format!("failed to write output '{}': {e}", path.display())),
        None => {
            print!("{markup}");
            Ok(())
        }
    }
}

fn init_config(run: &RunConfig) -> Result<(), String> {
    let path = run
        .config_path
        .clone()
        .or_else(config::default_config_path)
        .ok_or_else(|| "could not determine a home directory for the config file".to_string())?;
    let state = if config::write_default_config(&path)? {
        "written"
    } else {
        "exists, left unchanged"
    };
    eprintln!(
        "{}",
        format_kv_line("Config", &format!("{} ({state})", path.display()))
            .bold()
            .green()
    );
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    if matches!(run.command, Command::InitConfig) {
        return init_config(&run);
    }

    let keys = match &run.command {
        Command::Document {
            keys: Some(keys), ..
        } => crate::utils::parse_csv(keys),
        _ => run.collection_keys.clone(),
    };
    let transport = HttpTransport::new(run.proxy.as_deref()).map_err(|e| e.to_string())?;
    let client = RemoteClient::new(&run.base_url, Arc::new(transport))
        .map_err(|e| e.to_string())?
        .with_rules(extract::rules_for_keys(keys.iter().map(String::as_str)));
    tracing::debug!(base_url = %client.base_url(), "client ready");
    let page = Page::with_resources(client, run.resources.clone());

    let outcome = execute(&page, &run).await?;
    emit(run.output.as_deref(), &outcome.markup).await?;

    if let Some(notice) = outcome.notice.as_deref() {
        eprintln!("{}", notice.bold().green());
    }
    if let Some(failure) = outcome.load_failed {
        return Err(format!("load failed: {failure}"));
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let cfg = match args.config.as_deref() {
        Some(path) => ConfigFile::load(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => ConfigFile::load(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    init_tracing(run.verbose);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
