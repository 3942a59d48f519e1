//! Fan-out of event records to named routes.
//!
//! Every route carries a predicate statement. A record goes to each route
//! whose predicate evaluates to `true` for it, so it can land in several
//! groups or none. Routes whose statements are textually identical share a
//! single compiled predicate, which is evaluated once per record.

use std::{collections::BTreeMap, sync::Arc};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    ast::{CompileError, Statement},
    evaluator::{EvalError, Evaluator},
    event::Record,
};

/// A route as it appears in pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub name: String,
    /// Predicate statement, e.g. `/status >= 400`
    #[serde(alias = "when")]
    pub condition: String,
}

impl RouteConfig {
    pub fn new(name: impl Into<String>, condition: impl Into<String>) -> Self {
        RouteConfig {
            name: name.into(),
            condition: condition.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Route '{route}' has an invalid condition: {source}")]
    InvalidCondition {
        route: String,
        #[source]
        source: CompileError,
    },

    #[error("Route '{0}' is defined more than once")]
    DuplicateRoute(String),
}

/// A predicate shared by one or more routes.
#[derive(Debug)]
struct PredicateGroup {
    statement: Arc<Statement>,
    /// Indexes into `Router::routes`
    routes: Vec<usize>,
}

/// Routes records by evaluating each route's predicate against them.
///
/// Immutable once built; `route` can be called concurrently.
#[derive(Debug)]
pub struct Router {
    routes: Vec<String>,
    predicates: Vec<PredicateGroup>,
    evaluator: Evaluator,
}

/// A record that could not be evaluated for a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFailure {
    pub route: String,
    /// Position of the record in the routed batch
    pub record_index: usize,
    pub error: EvalError,
}

/// Result of routing a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedRecords<R> {
    /// Every configured route, with the records it received in input order
    pub routes: BTreeMap<String, Vec<R>>,
    pub failures: Vec<RouteFailure>,
}

impl<R> RoutedRecords<R> {
    pub fn get(&self, route: &str) -> Option<&[R]> {
        self.routes.get(route).map(Vec::as_slice)
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl Router {
    /// Compile every route's condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use prepper_expression::{Event, RouteConfig, Router};
    /// use serde_json::json;
    ///
    /// let router = Router::new([
    ///     RouteConfig::new("ok", "/status == 200"),
    ///     RouteConfig::new("err", "/status >= 400"),
    /// ])
    /// .unwrap();
    ///
    /// let records = vec![Event::from(json!({"status": 200})), Event::from(json!({"status": 404}))];
    /// let routed = router.route(&records);
    /// assert_eq!(routed.get("ok").unwrap(), &records[..1]);
    /// assert_eq!(routed.get("err").unwrap(), &records[1..]);
    /// ```
    pub fn new<I>(routes: I) -> Result<Self, RouterError>
    where
        I: IntoIterator<Item = RouteConfig>,
    {
        let mut names: Vec<String> = vec![];
        let mut predicates: Vec<PredicateGroup> = vec![];

        for route in routes {
            if names.contains(&route.name) {
                return Err(RouterError::DuplicateRoute(route.name));
            }
            let index = names.len();

            match predicates
                .iter_mut()
                .find(|group| group.statement.text() == route.condition)
            {
                Some(group) => group.routes.push(index),
                None => {
                    let statement = Statement::compile(&route.condition).map_err(|source| {
                        RouterError::InvalidCondition {
                            route: route.name.clone(),
                            source,
                        }
                    })?;
                    predicates.push(PredicateGroup {
                        statement: Arc::new(statement),
                        routes: vec![index],
                    });
                }
            }
            names.push(route.name);
        }

        debug!(
            routes = names.len(),
            predicates = predicates.len(),
            "router ready"
        );

        Ok(Router {
            routes: names,
            predicates,
            evaluator: Evaluator::new(),
        })
    }

    pub fn route_names(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(String::as_str)
    }

    /// Number of distinct compiled predicates.
    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    /// Partition `records` among the routes.
    ///
    /// Records are evaluated in parallel; groups are assembled afterwards in
    /// input order. An evaluation error excludes the record from the
    /// affected routes only and is reported in `failures`.
    pub fn route<R>(&self, records: &[R]) -> RoutedRecords<R>
    where
        R: Record + Clone + Sync,
    {
        debug!(records = records.len(), routes = self.routes.len(), "routing batch");

        let verdicts: Vec<Vec<Result<bool, EvalError>>> = records
            .par_iter()
            .map(|record| {
                self.predicates
                    .iter()
                    .map(|group| {
                        self.evaluator
                            .evaluate_conditional(group.statement.expr(), record.event())
                    })
                    .collect()
            })
            .collect();

        let mut groups: Vec<Vec<R>> = vec![Vec::new(); self.routes.len()];
        let mut failures = vec![];

        for (record_index, (record, results)) in records.iter().zip(verdicts).enumerate() {
            for (group, result) in self.predicates.iter().zip(results) {
                match result {
                    Ok(true) => {
                        for &route in &group.routes {
                            groups[route].push(record.clone());
                        }
                    }
                    Ok(false) => {}
                    Err(error) => {
                        for &route in &group.routes {
                            let name = &self.routes[route];
                            warn!(route = %name, record_index, %error, "route condition failed");
                            failures.push(RouteFailure {
                                route: name.clone(),
                                record_index,
                                error: error.clone(),
                            });
                        }
                    }
                }
            }
        }

        RoutedRecords {
            routes: self.routes.iter().cloned().zip(groups).collect(),
            failures,
        }
    }
}
