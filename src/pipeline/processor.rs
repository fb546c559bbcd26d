// Per-position record builders and the batch producer.
use super::context::TaskContext;
use super::writer::FeedRecord;
use crate::classifier::Classifier;
use crate::description::{build_body, build_title, finalize, product_detail};
use crate::listing::offer_id;
use crate::mapper::{self, MapperEnv};
use crate::model::{FeedError, Offer, Position, PropValue, Properties, SkipReason, StockOffer};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Turns one position into an output record, or says why it was skipped.
pub trait RecordBuilder: Send + Sync {
    type Record: FeedRecord + Send + 'static;

    fn build(&self, pos: &Position) -> Result<Self::Record, SkipReason>;
}

/// Counters of one task run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub batches: usize,
    pub records: usize,
    pub skipped: HashMap<SkipReason, usize>,
}

impl TaskSummary {
    pub fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or_default()
    }
}

/// Position with its enrichment, images and description body, shared by both builders.
struct Prepared {
    pos: Position,
    raw: Properties,
    props: Properties,
    images: Vec<String>,
    body: String,
}

fn prepare(ctx: &TaskContext, source: &Position) -> Result<Prepared, SkipReason> {
    let mut pos = source.clone();
    let raw = ctx
        .properties
        .get(&pos.property_key())
        .cloned()
        .unwrap_or_default();

    if pos.goods_group_code.is_empty() {
        if let Some(group) = raw.goods_group() {
            pos.goods_group_code = group.to_string();
        }
    }

    let pack = ctx.params.goods_group_pack.get(&pos.goods_group_code);
    let props = mapper::translate(&raw, pack.map(|p| &p.translated_props));

    let images = ctx.images.resolve(&pos, &props)?;

    if pos.description.is_empty() {
        if let Some(descr) = props.text("descr") {
            pos.description = descr.to_string();
        }
    }

    let source_policy = ctx.params.priority_description_source;
    let params = match pack {
        Some(pack) => mapper::offer_params(&pos, &props, &pack.pns, source_policy),
        None => mapper::offer_params(&pos, &props, &HashMap::new(), source_policy),
    };
    let body = build_body(
        &pos,
        &product_detail(&params),
        source_policy,
        &ctx.params.localization,
        ctx.remove_statement_type,
    );
    if ctx.filter.excludes(&body) {
        return Err(SkipReason::FilteredDescription);
    }

    Ok(Prepared {
        pos,
        raw,
        props,
        images,
        body,
    })
}

/// Builds full advertisement records.
pub struct OfferBuilder {
    ctx: Arc<TaskContext>,
}

impl OfferBuilder {
    pub fn new(ctx: Arc<TaskContext>) -> Self {
        Self { ctx }
    }
}

impl RecordBuilder for OfferBuilder {
    type Record = Offer;

    fn build(&self, source: &Position) -> Result<Offer, SkipReason> {
        let ctx = &self.ctx;
        let Prepared {
            pos,
            raw,
            mut props,
            images,
            body,
        } = prepare(ctx, source)?;
        let policy = ctx.params.priority_description_source;

        let mut offer = ctx.template.offer_for(&pos);
        offer.images = images;
        offer.description = finalize(&body, &ctx.sales_conditions);

        let classification = Classifier::new(&ctx.reference, policy).classify(&pos, &offer.brand, &props);
        if let Some(group) = &classification.goods_group_override {
            props.insert("goods_group", PropValue::Text(group.clone()));
        }
        classification.apply_to(&mut offer);

        let env = MapperEnv {
            reference: &ctx.reference,
            tires: &ctx.tires,
        };
        mapper::apply_families(&mut offer, &pos, &props, &raw, &env)?;

        offer.title = build_title(&pos, &props, &ctx.params.localization, policy);
        ctx.template.apply_price(&mut offer, pos.price_sale);
        Ok(offer)
    }
}

/// Builds stock-update records, filtered by the same description and picture rules.
pub struct StockBuilder {
    ctx: Arc<TaskContext>,
}

impl StockBuilder {
    pub fn new(ctx: Arc<TaskContext>) -> Self {
        Self { ctx }
    }
}

impl RecordBuilder for StockBuilder {
    type Record = StockOffer;

    fn build(&self, source: &Position) -> Result<StockOffer, SkipReason> {
        let prepared = prepare(&self.ctx, source)?;
        Ok(StockOffer {
            id: offer_id(&prepared.pos, self.ctx.template.offer_id_strategy),
            stock: prepared.pos.availability,
        })
    }
}

/// Pulls position batches, builds records and pushes one deduplicated batch per input batch.
///
/// Records sharing an id collapse: the last one wins and keeps the slot of the first.
pub async fn produce<B: RecordBuilder>(
    builder: &B,
    mut input: mpsc::Receiver<Vec<Position>>,
    output: mpsc::Sender<Vec<B::Record>>,
) -> Result<TaskSummary, FeedError> {
    let mut summary = TaskSummary::default();

    while let Some(positions) = input.recv().await {
        let mut batch: IndexMap<String, B::Record> = IndexMap::with_capacity(positions.len());
        for pos in &positions {
            match builder.build(pos) {
                Ok(record) => {
                    batch.insert(record.id().to_string(), record);
                }
                Err(reason) => {
                    debug!(brand = %pos.brand, number = %pos.number, ?reason, "Position skipped");
                    summary.skip(reason);
                }
            }
        }

        summary.batches += 1;
        summary.records += batch.len();
        output
            .send(batch.into_values().collect())
            .await
            .map_err(|_| FeedError::QueueClosed)?;
    }

    info!(
        "Offers built for {} records in {} batches, {} positions skipped",
        summary.records,
        summary.batches,
        summary.skipped_total()
    );
    Ok(summary)
}
