//! Object commands: fetch, children, create, save, delete, assign.

use bambou::{DynamicEntity, FetchingInfo, Identifiable, Storer};
use serde_json::Value;

use super::VsdSession;
use super::util;
use crate::cli::{AssignArgs, ChildrenArgs, CreateArgs, DeleteArgs, FetchArgs, GlobalOpts, SaveArgs};
use crate::error::CliError;
use crate::output;

const API_KEY_ATTRIBUTE: &str = "APIKey";

fn print_entity(entity: &DynamicEntity, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(global.format(), entity, |e| e.identifier().to_owned())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn fetch(session: &VsdSession, args: FetchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.object.is_root() {
        // Already fetched by `start`; never echo the API key.
        let mut root = session.root().await;
        root.attributes.remove(API_KEY_ATTRIBUTE);
        let out = output::render_single(global.format(), &root, |r| r.identifier().to_owned())?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let mut entity = util::entity(&args.object);
    session.fetch_entity(&mut entity).await?;
    print_entity(&entity, global)
}

pub async fn children(
    session: &VsdSession,
    args: ChildrenArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let parent = util::entity(&args.parent);
    let identity = util::identity(&args.category);

    let mut info = FetchingInfo {
        filter: args.filter.unwrap_or_default(),
        order_by: args.order_by.unwrap_or_default(),
        page: args.page,
        page_size: args.page_size,
        group_by: args.group_by,
        ..FetchingInfo::default()
    };

    let mut list: Vec<DynamicEntity> = Vec::new();
    session
        .fetch_children(&parent, &identity, &mut list, Some(&mut info))
        .await?;

    tracing::debug!(parent = %args.parent, count = list.len(), total = info.total_count, "listed children");

    let out = output::render_list(global.format(), &list, |e| e.identifier().to_owned())?;
    output::print_output(&out, global.quiet);

    if args.count {
        eprintln!("{} {} in total", info.total_count, args.category);
    }
    Ok(())
}

pub async fn create(session: &VsdSession, args: CreateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let parent = util::entity(&args.parent);
    let data = util::read_data(&args.data)?;

    let mut child = DynamicEntity::from_value(util::identity(&args.category), data);
    session.create_child(&parent, &mut child).await?;
    print_entity(&child, global)
}

pub async fn save(session: &VsdSession, args: SaveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut entity = util::entity(&args.object);
    if let Value::Object(changes) = util::read_data(&args.data)? {
        entity.attributes.extend(changes);
    }
    // The address wins over any ID in the payload.
    if let Some(ref id) = args.object.id {
        entity.set("ID", id.clone());
    }

    session.save_entity(&mut entity).await?;
    print_entity(&entity, global)
}

pub async fn delete(session: &VsdSession, args: DeleteArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let entity = util::entity(&args.object);
    session.delete_entity(&entity).await?;

    if !global.quiet {
        eprintln!("deleted {}", args.object);
    }
    Ok(())
}

pub async fn assign(session: &VsdSession, args: AssignArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let parent = util::entity(&args.parent);
    let identity = util::identity(&args.category);

    let members: Vec<DynamicEntity> = args
        .ids
        .iter()
        .map(|id| DynamicEntity::new(identity.clone()).with_id(id.clone()))
        .collect();

    session.assign_children(&parent, &members, &identity).await?;

    if !global.quiet {
        eprintln!("assigned {} {} to {}", members.len(), args.category, args.parent);
    }
    Ok(())
}
