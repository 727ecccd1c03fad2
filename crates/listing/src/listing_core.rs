//! ListingCore - the list use case

use crate::error::ListingError;
use crate::page::{ListingPage, ListingRow, NameStatus};
use crate::request::{ListKind, ListRequest};
use chrono::{Duration as ChronoDuration, Utc};
use query::{Paginator, Query, QueryEngine, SortStrategy};
use resolver::{IdentityResolutionPipeline, PipelineConfig, RemoteNameSource, ResolutionError};
use shared::{Identity, ListingConfig, Logger, Resource, ResourceStore};
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// The actor a listing is rendered for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub identity: Identity,
    /// World the viewer is standing in
    pub world: Option<String>,
    /// Area the viewer is standing in
    pub area: Option<String>,
}

impl Viewer {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            world: None,
            area: None,
        }
    }

    pub fn in_world(mut self, world: impl Into<String>) -> Self {
        self.world = Some(world.into());
        self
    }

    pub fn in_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }
}

/// Query plus the heading shown above its pages
struct PlannedQuery {
    title: String,
    query: Query,
}

impl PlannedQuery {
    fn new(title: impl Into<String>, query: Query) -> Self {
        Self {
            title: title.into(),
            query,
        }
    }
}

/// Wires store, query engine, paginator and name pipeline together
pub struct ListingCore {
    logger: Arc<dyn Logger>,
    config: ListingConfig,
    store: Arc<dyn ResourceStore>,
    pipeline: IdentityResolutionPipeline,
    paginator: Paginator,
}

impl ListingCore {
    /// Create a new ListingCore; fails on an invalid configuration
    pub fn new(
        logger: Arc<dyn Logger>,
        config: ListingConfig,
        store: Arc<dyn ResourceStore>,
        names: Arc<dyn RemoteNameSource>,
    ) -> shared::Result<Self> {
        config.validate()?;
        let page_size = NonZeroUsize::new(config.page_size)
            .ok_or_else(|| shared::Error::Config("pageSize must be greater than 0".to_string()))?;
        let pipeline = IdentityResolutionPipeline::new(logger.clone(), names, PipelineConfig::from(&config));

        Ok(Self {
            logger,
            config,
            store,
            pipeline,
            paginator: Paginator::new(page_size),
        })
    }

    pub fn config(&self) -> &ListingConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &IdentityResolutionPipeline {
        &self.pipeline
    }

    /// Distinct world names known to the store
    pub fn worlds(&self) -> Vec<String> {
        let worlds: BTreeSet<String> = self.store.all().into_iter().map(|r| r.world).collect();
        worlds.into_iter().collect()
    }

    /// Completions for the first `list` argument, including player names
    /// already resolved by the name pipeline
    pub fn completions(&self, prefix: &str) -> Vec<String> {
        let players = self.pipeline.known_names();
        ListKind::completions(prefix, &self.worlds(), &players, self.config.economy_enabled)
    }

    /// Parse `list` arguments against this core's configuration
    pub fn request<S: AsRef<str>>(&self, args: &[S]) -> Result<ListRequest, ListingError> {
        ListRequest::from_args(args, self.config.economy_enabled)
    }

    /// Render one page of a listing
    pub async fn list(&self, viewer: &Viewer, request: &ListRequest) -> Result<ListingPage, ListingError> {
        self.list_until(viewer, request, std::future::pending::<()>()).await
    }

    /// Like [`list`](Self::list); name resolution stops when `interrupt` completes
    pub async fn list_until<F>(&self, viewer: &Viewer, request: &ListRequest, interrupt: F) -> Result<ListingPage, ListingError>
    where
        F: Future<Output = ()>,
    {
        let planned = self.plan(viewer, &request.kind).await?;
        let resources = QueryEngine::evaluate(&planned.query, self.store.as_ref());
        let page = self.paginator.page(&resources, request.page.index());

        self.logger.debug(
            &format!(
                "Listing '{}': {} resources, page {}/{}",
                planned.title,
                resources.len(),
                page.page_number(),
                page.total_pages()
            ),
            None,
        );

        let identities: BTreeSet<Identity> = page.items().iter().flat_map(Resource::identities).collect();
        let (names, name_status) = self.resolve_names(identities, interrupt).await;

        let rows = page
            .items()
            .iter()
            .enumerate()
            .map(|(offset, resource)| {
                ListingRow::build(page.first_item_number() + offset, resource, &viewer.identity, &names)
            })
            .collect();

        Ok(ListingPage {
            title: planned.title,
            page_number: page.page_number(),
            total_pages: page.total_pages(),
            total_items: resources.len(),
            rows,
            name_status,
        })
    }

    /// One bounded batch for every identity on the page
    async fn resolve_names<F>(
        &self,
        identities: BTreeSet<Identity>,
        interrupt: F,
    ) -> (HashMap<Identity, resolver::IdentityMapping>, NameStatus)
    where
        F: Future<Output = ()>,
    {
        if identities.is_empty() {
            return (HashMap::new(), NameStatus::Complete);
        }

        match self
            .pipeline
            .resolve_many_until(identities, self.config.blocking_timeout(), interrupt)
            .await
        {
            Ok(names) => (names, NameStatus::Complete),
            Err(ResolutionError::TimedOut { partial, pending }) => {
                self.logger.info(&format!("Listing rendered with {} names pending", pending), None);
                (partial, NameStatus::TimedOut { pending })
            }
            Err(err) => {
                self.logger.warn(&format!("Listing rendered without names: {}", err), None);
                (HashMap::new(), NameStatus::Interrupted)
            }
        }
    }

    async fn plan(&self, viewer: &Viewer, kind: &ListKind) -> Result<PlannedQuery, ListingError> {
        let me = viewer.identity;
        let planned = match kind {
            ListKind::Mine => PlannedQuery::new(
                "Your plots",
                Query::owned_by(me).with_sorting_strategy(SortStrategy::ByTemporalRecency),
            ),
            ListKind::Shared => PlannedQuery::new(
                "Plots shared with you",
                Query::with_member(me)
                    .that_passes(move |r| !r.is_owner(&me))
                    .with_sorting_strategy(SortStrategy::ByCreationOrder),
            ),
            ListKind::World => match &viewer.world {
                Some(world) => PlannedQuery::new(
                    format!("Plots in {}", world),
                    Query::in_world(world.clone()).with_sorting_strategy(SortStrategy::ByCreationOrder),
                ),
                None => PlannedQuery::new("Plots in this world", Query::none()),
            },
            ListKind::Area => match &viewer.area {
                Some(area) => PlannedQuery::new(
                    format!("Plots in area {}", area),
                    Query::in_area(area.clone()).with_sorting_strategy(SortStrategy::ByCreationOrder),
                ),
                None => PlannedQuery::new("Plots in this area", Query::none()),
            },
            ListKind::All => PlannedQuery::new(
                "All plots",
                Query::all().with_sorting_strategy(SortStrategy::ByCreationOrder),
            ),
            ListKind::Done => PlannedQuery::new(
                "Finished plots",
                Query::all()
                    .that_passes(Resource::is_done)
                    .with_sorting_strategy(SortStrategy::ByDoneStatus),
            ),
            ListKind::Top => PlannedQuery::new(
                "Top rated plots",
                Query::all().with_sorting_strategy(SortStrategy::ByRating),
            ),
            ListKind::ForSale => {
                if !self.config.economy_enabled {
                    return Err(ListingError::EconomyDisabled);
                }
                PlannedQuery::new(
                    "Plots for sale",
                    Query::all()
                        .that_passes(|r| r.price() > 0.0)
                        .with_sorting_strategy(SortStrategy::ByCreationOrder),
                )
            }
            ListKind::Unowned => PlannedQuery::new(
                "Unowned plots",
                Query::all()
                    .that_passes(|r| r.owner.is_none())
                    .with_sorting_strategy(SortStrategy::ByCreationOrder),
            ),
            ListKind::Expired => PlannedQuery::new("Expired plots", self.expired_query()),
            ListKind::Fuzzy(term) => PlannedQuery::new(format!("Plots matching '{}'", term), Query::search(term.clone())),
            ListKind::Named(arg) => self.plan_named(arg).await?,
        };

        let query = planned.query.where_base();
        let query = match &viewer.area {
            Some(area) => query.relative_to_area(area.clone()),
            None => query,
        };
        Ok(PlannedQuery::new(planned.title, query))
    }

    fn expired_query(&self) -> Query {
        let Some(days) = self.config.expiry_days else {
            return Query::none();
        };
        let cutoff = Utc::now() - ChronoDuration::days(i64::from(days));
        Query::all()
            .that_passes(move |r| r.owner.is_some() && r.last_activity() < cutoff)
            .with_sorting_strategy(SortStrategy::ByCreationOrder)
    }

    /// A known world, else a player name or identity
    async fn plan_named(&self, arg: &str) -> Result<PlannedQuery, ListingError> {
        if let Some(world) = self.worlds().into_iter().find(|w| w.eq_ignore_ascii_case(arg)) {
            return Ok(PlannedQuery::new(
                format!("Plots in {}", world),
                Query::in_world(world).with_sorting_strategy(SortStrategy::ByCreationOrder),
            ));
        }

        let mapping = match self.pipeline.resolve_one(arg).await {
            Ok(mapping) => mapping,
            Err(ResolutionError::IdentityNotFound { key }) => {
                self.logger.info(&format!("No player matches '{}'", key), None);
                return Err(ListingError::InvalidPlayer { key });
            }
            Err(err) => return Err(err.into()),
        };

        Ok(PlannedQuery::new(
            format!("Plots owned by {}", mapping.display_name()),
            Query::owned_by(mapping.identity()).with_sorting_strategy(SortStrategy::ByTemporalRecency),
        ))
    }
}
