//! CLI command implementations
//!
//! Every command loads the configuration, opens the store (creating it on
//! first use), performs exactly one operation and writes one JSON response.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event, Logger};
use crate::payment::{
    Chunk, Deadline, Filter, PaymentService, PaymentUpsert, Selection, Sort, SortField,
};
use crate::store::{SqlitePaymentStore, StoreConfig};

use super::args::{Cli, Command, SortArg};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments, dispatches, and reports any failure as an error
/// response before returning it. Logs go to stderr so stdout carries only
/// the response.
pub fn run() -> CliResult<()> {
    Logger::set_stderr_only(true);
    let cli = Cli::parse_args();
    let result = run_command(&cli);
    if let Err(ref e) = result {
        write_error(e.code(), &e.to_string())?;
    }
    result
}

/// Runs one parsed command
pub fn run_command(cli: &Cli) -> CliResult<()> {
    let config = StoreConfig::load(&cli.config)?;
    let config_path = cli.config.display().to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("path", &config_path)]);

    let store = SqlitePaymentStore::open(config)?;
    let deadline = cli.deadline();

    let data = match &cli.command {
        Command::Init => init(&store),
        Command::Create => create(&store, deadline, read_request()?),
        Command::Get { id, fields } => get(&store, deadline, *id, fields.as_deref()),
        Command::Update { id, version } => {
            update(&store, deadline, *id, *version, read_request()?)
        }
        Command::Delete { id } => delete(&store, deadline, *id),
        Command::Find {
            organisation,
            payment_type,
            sort,
            desc,
            fields,
            offset,
            limit,
        } => {
            let mut filter = Filter::any();
            if let Some(org) = organisation {
                filter = filter.organisation(*org);
            }
            if let Some(t) = payment_type {
                filter = filter.payment_type(t.clone());
            }
            let sort = sort.map(|s| sort_of(s, *desc));
            find(
                &store,
                deadline,
                &filter,
                fields.as_deref(),
                sort,
                Chunk::new(*offset, *limit),
            )
        }
    }?;

    write_response(data)
}

/// Creates or verifies the store
pub fn init(store: &SqlitePaymentStore) -> CliResult<Value> {
    Ok(json!({
        "initialized": true,
        "path": store.path().display().to_string(),
    }))
}

pub fn create(
    store: &SqlitePaymentStore,
    deadline: Deadline,
    upsert: PaymentUpsert,
) -> CliResult<Value> {
    let id = store.create(deadline, &upsert)?;
    Ok(json!({ "id": id }))
}

pub fn get(
    store: &SqlitePaymentStore,
    deadline: Deadline,
    id: Uuid,
    fields: Option<&str>,
) -> CliResult<Value> {
    let selection = selection_of(fields)?;
    let payment = store.get(deadline, id, &selection)?;
    Ok(serde_json::to_value(payment)?)
}

pub fn update(
    store: &SqlitePaymentStore,
    deadline: Deadline,
    id: Uuid,
    version: u32,
    upsert: PaymentUpsert,
) -> CliResult<Value> {
    store.update(deadline, id, version, &upsert)?;
    Ok(json!({ "id": id, "version": u64::from(version) + 1 }))
}

pub fn delete(store: &SqlitePaymentStore, deadline: Deadline, id: Uuid) -> CliResult<Value> {
    store.delete(deadline, id)?;
    Ok(json!({ "id": id, "deleted": true }))
}

pub fn find(
    store: &SqlitePaymentStore,
    deadline: Deadline,
    filter: &Filter,
    fields: Option<&str>,
    sort: Option<Sort>,
    chunk: Chunk,
) -> CliResult<Value> {
    let selection = selection_of(fields)?;
    let payments = store.find(deadline, filter, &selection, sort, chunk)?;
    Ok(json!({
        "count": payments.len(),
        "payments": payments,
        "next_offset": chunk.next().offset,
    }))
}

fn selection_of(fields: Option<&str>) -> CliResult<Selection> {
    match fields {
        Some(list) => Selection::parse_fields(list)
            .map_err(|field| CliError::input(format!("unknown field '{}'", field))),
        None => Ok(Selection::all()),
    }
}

fn sort_of(arg: SortArg, desc: bool) -> Sort {
    let field = SortField::from(arg);
    if desc {
        Sort::desc(field)
    } else {
        Sort::asc(field)
    }
}
