use chrono::{Local, NaiveDate};
use clap::Parser;
use diary::application::init::init;
use diary::application::session::probe_remote;
use diary::application::{
    BackendService, BackupService, ConfigService, DiarySession, ImportOutcome,
    MaintenanceService, PostEditor, PostService,
};
use diary::cli::prompt::confirm;
use diary::cli::{
    format_backend_status, format_data_report, format_post_detail, format_post_list,
    format_replace_report, BackendAction, Cli, Commands, PostFields,
};
use diary::domain::dates::parse_input_date;
use diary::domain::Format;
use diary::error::{DiaryError, Result};
use diary::infrastructure::{DiaryRepository, EditorSession, FileSystemRepository};
use std::fs;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "DIARY_LOG";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path, remote } => init(&path, remote),
        Commands::List => {
            let session = open_session()?;
            let posts = PostService::new(session.store()).list()?;
            println!("{}", format_post_list(&posts).trim_end());
            Ok(())
        }
        Commands::Show { id } => {
            let session = open_session()?;
            let post = PostService::new(session.store()).show(&id)?;
            print!("{}", format_post_detail(&post));
            Ok(())
        }
        Commands::New { fields } => {
            let session = open_session()?;
            let mut editor = PostEditor::new(session.store(), session.config().paste_policy);
            let today = today();

            editor.open_for_create(today);
            let use_editor = !fields.has_body();
            apply_fields(&mut editor, fields, today)?;
            if use_editor {
                let body = EditorSession::new(session.config().get_editor()).edit_text("")?;
                editor.set_content(body)?;
            }

            let id = editor.submit()?;
            println!("Created post {}", id);
            Ok(())
        }
        Commands::Edit {
            id,
            fields,
            remove_image,
        } => {
            let session = open_session()?;
            let post = PostService::new(session.store()).show(&id)?;
            let mut editor = PostEditor::new(session.store(), session.config().paste_policy);
            let today = today();

            editor.open_for_edit(&post, today);
            let use_editor = !fields.has_body()
                && fields.title.is_none()
                && fields.date.is_none()
                && fields.image.is_none()
                && !remove_image;
            apply_fields(&mut editor, fields, today)?;
            if remove_image {
                editor.clear_image()?;
            }
            if use_editor {
                let body = EditorSession::new(session.config().get_editor())
                    .edit_text(&post.content)?;
                editor.set_content(body)?;
            }

            editor.submit()?;
            println!("Updated post {}", id);
            Ok(())
        }
        Commands::Delete { id, yes } => {
            let session = open_session()?;
            let service = PostService::new(session.store());

            let Some(post) = session.store().get(&id)? else {
                println!("No post {}, nothing to delete", id);
                return Ok(());
            };
            if !yes && !confirm(&format!("Delete post '{}'?", post.title))? {
                println!("Cancelled");
                return Ok(());
            }

            match service.delete(&id)? {
                Some(_) => println!("Deleted post {}", id),
                None => println!("No post {}, nothing to delete", id),
            }
            Ok(())
        }
        Commands::Format {
            id,
            tag,
            selection,
            href,
        } => {
            let format = Format::from_tag(&tag, href.as_deref()).map_err(DiaryError::Config)?;
            let session = open_session()?;
            let post = PostService::new(session.store()).show(&id)?;
            let mut editor = PostEditor::new(session.store(), session.config().paste_policy);

            editor.open_for_edit(&post, today());
            if !editor.apply_format(&format, &selection)? {
                return Err(DiaryError::Config(format!(
                    "'{}' does not appear in post {}",
                    selection, id
                )));
            }
            editor.submit()?;
            println!("Formatted post {}", id);
            Ok(())
        }
        Commands::Export { dir, stdout } => {
            let session = open_session()?;
            let service = BackupService::new(session.store());

            if stdout {
                println!("{}", service.export_json()?);
            } else {
                let path = service.export_to(&dir, today())?;
                println!("Exported posts to {}", path.display());
            }
            Ok(())
        }
        Commands::Import { file, yes } => {
            let contents = fs::read_to_string(&file)?;
            let session = open_session()?;

            let outcome = BackupService::new(session.store()).import(&contents, |count| {
                Ok(yes
                    || confirm(&format!(
                        "Replace all {} posts with {} post(s) from the backup?",
                        session.status().effective,
                        count
                    ))?)
            })?;

            match outcome {
                ImportOutcome::Cancelled => {
                    println!("Import cancelled");
                    Ok(())
                }
                ImportOutcome::Restored(report) => {
                    print!("{}", format_replace_report(&report));
                    if report.is_complete() {
                        Ok(())
                    } else {
                        Err(DiaryError::PartialRestore(report.failed_ids()))
                    }
                }
            }
        }
        Commands::Backend { action } => {
            let repo = FileSystemRepository::discover()?;
            let config = repo.load_config()?;
            let root = repo.root().to_path_buf();
            let service = BackendService::new(repo.storage(), || probe_remote(&config, &root).1);

            let status = match action.unwrap_or(BackendAction::Status) {
                BackendAction::Status => service.status()?,
                BackendAction::Toggle => service.toggle()?,
                BackendAction::Local => service.set(false)?,
                BackendAction::Remote => service.set(true)?,
            };
            print!("{}", format_backend_status(&status));
            Ok(())
        }
        Commands::Config { key, value, list } => {
            let repo = FileSystemRepository::discover()?;
            let service = ConfigService::new(repo);

            if list {
                let config = service.list()?;
                println!(
                    "remote = {}",
                    config
                        .remote_path
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                );
                println!("paste_policy = {}", config.paste_policy);
                println!("editor = {}", config.editor);
                println!("ready_poll_interval_ms = {}", config.ready_poll_interval_ms);
                println!("ready_timeout_ms = {}", config.ready_timeout_ms);
                println!("created = {}", config.created.to_rfc3339());
                Ok(())
            } else if let Some(k) = key {
                if let Some(v) = value {
                    service.set(&k, &v)?;
                    println!("Set {} = {}", k, v);
                } else {
                    println!("{}", service.get(&k)?);
                }
                Ok(())
            } else {
                println!("Usage: diary config [--list | <key> [<value>]]");
                println!(
                    "Valid keys: remote, paste_policy, editor, ready_poll_interval_ms, ready_timeout_ms, created"
                );
                Ok(())
            }
        }
        Commands::Check => {
            let repo = FileSystemRepository::discover()?;
            let report = MaintenanceService::new(repo.storage()).check()?;
            print!("{}", format_data_report(&report));
            Ok(())
        }
        Commands::Clear { yes } => {
            let repo = FileSystemRepository::discover()?;

            if !yes && !confirm("Remove all locally stored posts?")? {
                println!("Cancelled");
                return Ok(());
            }

            MaintenanceService::new(repo.storage()).clear()?;
            println!("Local posts cleared");
            Ok(())
        }
    }
}

fn open_session() -> Result<DiarySession> {
    DiarySession::open(FileSystemRepository::discover()?)
}

fn apply_fields(editor: &mut PostEditor, fields: PostFields, today: NaiveDate) -> Result<()> {
    if let Some(title) = fields.title {
        editor.set_title(title)?;
    }
    if let Some(content) = fields.content {
        editor.set_content(content)?;
    }
    if fields.paste.is_some() || fields.text.is_some() {
        editor.paste(fields.paste.as_deref(), fields.text.as_deref().unwrap_or(""))?;
    }
    if let Some(input) = fields.date {
        let date = parse_input_date(&input).unwrap_or_else(|| {
            tracing::warn!(input = %input, "Unrecognized date, using today");
            today
        });
        editor.set_date(date)?;
    }
    if let Some(image) = fields.image {
        editor.attach_image(image)?;
    }
    Ok(())
}
