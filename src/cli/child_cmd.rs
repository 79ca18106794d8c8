//! Shared command infrastructure for the ordered children of a purchase
//!
//! Models and accessories are handled the same way: listed in position
//! order, appended at the end, removed with their later siblings closing
//! the gap, and moved between positions. [`ChildKind`] picks the right
//! list out of a [`PurchaseRecord`] so each command file only supplies its
//! own fields and columns.

use console::style;
use miette::Result;

use crate::cli::helpers::{open_in_editor, register_short_ids, report_skipped};
use crate::cli::output::{print_rows, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::collection::Collection;
use crate::core::config::Config;
use crate::core::entity::PurchaseItem;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::ordering::{ChildList, OrderedChild};
use crate::core::session::{PurchaseRecord, Session};
use crate::core::shortid::ShortIdIndex;

/// A record type kept as an ordered child of a purchase
pub trait ChildKind: PurchaseItem + OrderedChild<Key = EntityId> {
    /// Singular name for messages (e.g., "model")
    const NAME: &'static str;
    /// Plural name for messages (e.g., "models")
    const NAME_PLURAL: &'static str;
    /// List columns after POS and SHORT, with their table widths
    const COLUMNS: &'static [(&'static str, usize)];

    fn list(record: &PurchaseRecord) -> &ChildList<Self>;
    fn list_mut(record: &mut PurchaseRecord) -> &mut ChildList<Self>;

    /// Append a new child to the purchase
    fn append<'r>(record: &'r mut PurchaseRecord, session: &mut Session<'_>) -> &'r mut Self;

    /// Detach a child and queue its file for deletion
    fn detach(record: &mut PurchaseRecord, id: &EntityId, session: &mut Session<'_>);

    /// Cells for [`Self::COLUMNS`]
    fn cells(&self) -> Vec<String>;
}

/// Resolve a purchase reference and load it with its children
pub fn open_purchase<'c>(
    collection: &'c Collection,
    reference: &str,
) -> Result<(Session<'c>, PurchaseRecord)> {
    let id = collection.resolve(EntityPrefix::Pur, reference)?;
    let mut session = Session::new(collection);
    let record = session.load_purchase(&id)?;
    report_skipped(&session.take_skipped());
    Ok((session, record))
}

/// Refuse to change a list whose stored positions are inconsistent
fn ensure_consistent<C: ChildKind>(record: &PurchaseRecord, short_ids: &ShortIdIndex) -> Result<()> {
    match C::list(record).verify() {
        Ok(()) => Ok(()),
        Err(e) => Err(miette::miette!(
            help = "run `yardbook validate --fix` to renumber",
            "{} of {} are out of order: {}",
            C::NAME_PLURAL,
            short_ids.display(&record.id()),
            e
        )),
    }
}

/// List the children of a purchase in position order
pub fn run_list<C: ChildKind>(
    purchase: &str,
    filter: impl Fn(&C) -> bool,
    count_only: bool,
    global: &GlobalOpts,
) -> Result<()> {
    let collection = Collection::discover()?;
    let (_session, record) = open_purchase(&collection, purchase)?;

    let children: Vec<&C> = C::list(&record)
        .ordered()
        .into_iter()
        .filter(|c: &&C| filter(*c))
        .collect();

    if count_only {
        println!("{}", children.len());
        return Ok(());
    }

    let short_ids = register_short_ids(&collection, children.iter().map(|c| c.id()));

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&children, global.format)?,
        OutputFormat::Id => {
            for child in &children {
                println!("{}", child.id());
            }
        }
        OutputFormat::ShortId => {
            for child in &children {
                println!("{}", short_ids.display(child.id()));
            }
        }
        format => {
            if children.is_empty() {
                println!(
                    "No {} in {}.",
                    C::NAME_PLURAL,
                    short_ids.display(&record.id())
                );
                return Ok(());
            }

            let mut columns: Vec<(&str, usize)> = vec![("POS", 4), ("SHORT", 8)];
            columns.extend_from_slice(C::COLUMNS);

            let rows: Vec<Vec<String>> = children
                .iter()
                .map(|child| {
                    let mut row = vec![
                        child.position().to_string(),
                        short_ids.display(child.id()),
                    ];
                    row.extend(child.cells());
                    row
                })
                .collect();

            print_rows(&columns, &rows, format);
            if format == OutputFormat::Auto {
                print_list_footer(children.len(), C::PREFIX, C::NAME_PLURAL);
            }
        }
    }

    Ok(())
}

/// Append a child to a purchase, letting `fill` set its fields
pub fn run_add<C: ChildKind>(
    purchase: &str,
    fill: impl FnOnce(&mut C),
    edit: bool,
    global: &GlobalOpts,
) -> Result<()> {
    let collection = Collection::discover()?;
    let config = Config::load_for(Some(&collection));
    let (mut session, mut record) = open_purchase(&collection, purchase)?;
    ensure_consistent::<C>(&record, &ShortIdIndex::load(&collection))?;

    let child = C::append(&mut record, &mut session);
    fill(child);
    let (id, position, title) = (*child.id(), child.position(), child.title());

    session.commit(&mut record)?;
    let short_ids = register_short_ids(&collection, [&id]);
    let path = collection.entity_path(&id);

    match global.format {
        OutputFormat::Id => println!("{}", id),
        OutputFormat::ShortId => println!("{}", short_ids.display(&id)),
        _ => {
            println!(
                "{} Added {} {} at position {} of {}",
                style("✓").green(),
                C::NAME,
                style(short_ids.display(&id)).cyan(),
                position,
                style(short_ids.display(&record.id())).cyan()
            );
            println!("   {}", style(path.display()).dim());
            println!("   {}", style(&title).yellow());
        }
    }

    if edit {
        println!();
        open_in_editor(&config, &path)?;
    }

    Ok(())
}

/// Remove a child; later siblings move up one position
pub fn run_remove<C: ChildKind>(reference: &str, global: &GlobalOpts) -> Result<()> {
    let collection = Collection::discover()?;
    let id = collection.resolve(C::PREFIX, reference)?;
    let child: C = collection.load(&id)?;

    let mut short_ids = ShortIdIndex::load(&collection);
    let purchase = *child.purchase();
    if !collection.entity_path(&purchase).is_file() {
        return Err(miette::miette!(
            help = "delete the file by hand or run `yardbook validate`",
            "{} {} belongs to missing purchase {}",
            C::NAME,
            short_ids.display(&id),
            purchase
        ));
    }

    let mut session = Session::new(&collection);
    let mut record = session.load_purchase(&purchase)?;
    report_skipped(&session.take_skipped());
    ensure_consistent::<C>(&record, &short_ids)?;

    let position = child.position();
    C::detach(&mut record, &id, &mut session);
    let stats = session.commit(&mut record)?;

    let display = short_ids.display(&id);
    short_ids.forget(&id);
    if let Err(e) = short_ids.save(&collection) {
        tracing::warn!(error = %e, "failed to save short IDs");
    }

    if global.format == OutputFormat::Auto {
        println!(
            "{} Removed {} {} from position {} of {}",
            style("✓").green(),
            C::NAME,
            style(&display).cyan(),
            position,
            style(short_ids.display(&purchase)).cyan()
        );
        println!(
            "   {}",
            style(format!("{} file(s) rewritten", stats.written)).dim()
        );
    }

    Ok(())
}

/// Move the child at `from` to `to` within its purchase
pub fn run_move<C: ChildKind>(purchase: &str, from: i64, to: i64, global: &GlobalOpts) -> Result<()> {
    let collection = Collection::discover()?;
    let short_ids = ShortIdIndex::load(&collection);
    let (mut session, mut record) = open_purchase(&collection, purchase)?;
    ensure_consistent::<C>(&record, &short_ids)?;

    let max = C::list(&record).max_position();
    if max < 0 {
        return Err(miette::miette!(
            "{} has no {}",
            short_ids.display(&record.id()),
            C::NAME_PLURAL
        ));
    }
    for position in [from, to] {
        if !(0..=max).contains(&position) {
            return Err(miette::miette!(
                "position {} is out of range; {} of {} are numbered 0 to {}",
                position,
                C::NAME_PLURAL,
                short_ids.display(&record.id()),
                max
            ));
        }
    }

    let moved = C::list(&record)
        .at(from)
        .map(|c| *c.id())
        .ok_or_else(|| miette::miette!("no {} at position {}", C::NAME, from))?;

    C::list_mut(&mut record).move_at(from, to);
    let stats = session.commit(&mut record)?;

    if global.format == OutputFormat::Auto {
        if from == to {
            println!("Nothing to move.");
        } else {
            println!(
                "{} Moved {} {} from position {} to {}",
                style("✓").green(),
                C::NAME,
                style(short_ids.display(&moved)).cyan(),
                from,
                to
            );
            println!(
                "   {}",
                style(format!("{} file(s) rewritten", stats.written)).dim()
            );
        }
    }

    Ok(())
}

/// Print list footer with count
pub fn print_list_footer(count: usize, prefix: EntityPrefix, name_plural: &str) {
    println!();
    println!(
        "{} {} found. Use {} to reference by short ID.",
        style(count).cyan(),
        name_plural,
        style(format!("{}@N", prefix)).cyan()
    );
}
