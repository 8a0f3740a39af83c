//! Per-domain aggregation plans for availability, status and metric queries

use crate::filter::filter::{day_bucket, time_of_day};
use crate::filter::plan::{Average, Projection, AVAILABILITY, AVG_DOWN, AVG_UNKNOWN, AVG_UP, RELIABILITY};
use crate::filter::{Filter, FilterOrderInfo, FilterWhere, Granularity, QueryPlan, Stage};

pub const DATE: &str = "dt";
pub const NAMESPACE: &str = "ns";
pub const PROFILE: &str = "ap";
pub const UP: &str = "up";
pub const UNKNOWN: &str = "u";
pub const DOWN: &str = "d";
pub const INFRASTRUCTURE: &str = "i";
pub const PRODUCTION: &str = "pr";
pub const MONITORED: &str = "m";
pub const CERTIFICATION: &str = "cs";

/// Shape of one availability collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub name: &'static str,
    pub collection: &'static str,
    /// Field restricted by `group_name`
    pub group_field: &'static str,
    /// Field restricted by `flavor`
    pub flavor_field: Option<&'static str>,
    /// Parent → child group fields, used for ordering
    pub hierarchy: &'static [&'static str],
    /// Dimensions carried through both granularities (and grouped on monthly)
    pub keys: &'static [&'static str],
    /// Carried by the daily projection only
    pub daily_only: &'static [&'static str],
    /// Whether infrastructure/production/monitored/certification apply
    pub flags: bool,
}

pub const SITES: Domain = Domain {
    name: "sites",
    collection: "sites",
    group_field: "s",
    flavor_field: None,
    hierarchy: &["n", "s"],
    keys: &[NAMESPACE, PROFILE, "n", "s", INFRASTRUCTURE, PRODUCTION, MONITORED, CERTIFICATION],
    daily_only: &["sc", "ss"],
    flags: true,
};

pub const NGIS: Domain = Domain {
    name: "ngis",
    collection: "ngis",
    group_field: "n",
    flavor_field: None,
    hierarchy: &["n"],
    keys: &[NAMESPACE, PROFILE, "n"],
    daily_only: &[],
    flags: false,
};

pub const VOS: Domain = Domain {
    name: "vos",
    collection: "voreports",
    group_field: "v",
    flavor_field: None,
    hierarchy: &["v"],
    keys: &[NAMESPACE, PROFILE, "v"],
    daily_only: &[],
    flags: false,
};

pub const SERVICE_FLAVORS: Domain = Domain {
    name: "service_flavors",
    collection: "sfreports",
    group_field: "s",
    flavor_field: Some("sf"),
    hierarchy: &["s", "sf"],
    keys: &[NAMESPACE, PROFILE, "s", "sf"],
    daily_only: &[],
    flags: false,
};

fn owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

pub struct QueryBuilder {
    domain: Domain,
}

impl QueryBuilder {
    pub fn new(domain: Domain) -> Self {
        Self { domain }
    }

    pub fn build(&self, filter: &Filter, granularity: Granularity) -> QueryPlan {
        match granularity {
            Granularity::Daily => self.daily(filter),
            Granularity::Monthly => self.monthly(filter),
        }
    }

    fn match_stage(&self, filter: &Filter) -> Stage {
        let mut conditions = FilterWhere::new().between(DATE, filter.start_day(), filter.end_day());

        if let Some(profile) = &filter.profile {
            conditions = conditions.eq(PROFILE, profile.as_str());
        }

        conditions = conditions.is_in(self.domain.group_field, filter.group_names.iter().cloned());

        if let Some(flavor_field) = self.domain.flavor_field {
            conditions = conditions.is_in(flavor_field, filter.flavors.iter().cloned());
        }

        if self.domain.flags {
            let flags = [
                (INFRASTRUCTURE, &filter.infrastructure),
                (CERTIFICATION, &filter.certification),
                (PRODUCTION, &filter.production),
                (MONITORED, &filter.monitored),
            ];
            for (field, value) in flags {
                if let Some(value) = value {
                    conditions = conditions.eq(field, value.as_str());
                }
            }
        }

        Stage::Match(conditions)
    }

    fn daily(&self, filter: &Filter) -> QueryPlan {
        let mut keep = owned(self.domain.keys);
        keep.extend(owned(self.domain.daily_only));
        keep.push(AVAILABILITY.to_string());
        keep.push(RELIABILITY.to_string());

        let mut order = vec![FilterOrderInfo::asc(PROFILE)];
        order.extend(self.domain.hierarchy.iter().map(|f| FilterOrderInfo::asc(*f)));
        order.push(FilterOrderInfo::asc(DATE));

        QueryPlan::new(vec![
            self.match_stage(filter),
            Stage::Project(Projection::TruncateDate {
                field: DATE.to_string(),
                len: Granularity::Daily.date_len(),
                keep,
            }),
            Stage::Sort(order),
        ])
    }

    fn monthly(&self, filter: &Filter) -> QueryPlan {
        let keys = owned(self.domain.keys);

        let mut order = vec![FilterOrderInfo::asc(NAMESPACE), FilterOrderInfo::asc(PROFILE)];
        order.extend(self.domain.hierarchy.iter().map(|f| FilterOrderInfo::asc(*f)));
        order.push(FilterOrderInfo::asc(DATE));

        QueryPlan::new(vec![
            self.match_stage(filter),
            Stage::GroupAndAverage {
                date_field: DATE.to_string(),
                date_len: Granularity::Monthly.date_len(),
                keys: keys.clone(),
                averages: vec![
                    Average::new(AVG_UP, UP),
                    Average::new(AVG_UNKNOWN, UNKNOWN),
                    Average::new(AVG_DOWN, DOWN),
                ],
            },
            Stage::Project(Projection::Availability {
                date_field: DATE.to_string(),
                keys,
            }),
            Stage::Sort(order),
        ])
    }
}

pub const STATUS_SITES_COLLECTION: &str = "status_sites";
pub const STATUS_METRICS_COLLECTION: &str = "status_metrics";

/// Status timeline of a site or of every site in an NGI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusQuery {
    pub start_time: String,
    pub end_time: String,
    /// Empty matches every profile
    pub profile: String,
    /// "site" or "ngi"
    pub group_type: String,
    pub group: String,
}

impl StatusQuery {
    pub fn build(&self) -> QueryPlan {
        let group_field = if self.group_type.eq_ignore_ascii_case("ngi") { "roc" } else { "site" };
        let mut conditions = FilterWhere::new();
        if !self.profile.is_empty() {
            conditions = conditions.eq("p", self.profile.as_str());
        }
        let conditions = conditions
            .eq(group_field, self.group.as_str())
            .between("ts", self.start_time.as_str(), self.end_time.as_str());

        QueryPlan::new(vec![
            Stage::Match(conditions),
            Stage::Sort(vec![
                FilterOrderInfo::asc("p"),
                FilterOrderInfo::asc("roc"),
                FilterOrderInfo::asc("site"),
                FilterOrderInfo::asc("ts"),
            ]),
        ])
    }
}

/// Lookup of one probe execution by endpoint, metric and execution time
pub fn metric_result_query(endpoint: &str, metric: &str, exec_time: &str) -> FilterWhere {
    FilterWhere::new()
        .eq("date_integer", day_bucket(exec_time))
        .eq("host", endpoint)
        .eq("metric", metric)
        .eq("time_integer", time_of_day(exec_time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterOp, RawParams};
    use mongodb::bson::doc;

    fn filter(query: &str) -> Filter {
        Filter::from_params(&RawParams::parse(Some(query))).unwrap()
    }

    fn match_conditions(plan: &QueryPlan) -> &FilterWhere {
        match &plan.stages()[0] {
            Stage::Match(conditions) => conditions,
            other => panic!("expected match stage, got {:?}", other),
        }
    }

    #[test]
    fn daily_site_pipeline_shape() {
        let f = filter("start_time=2015-06-20T12:00:00Z&end_time=2015-06-23T23:00:00Z&availability_profile=ch.cern.sam.ROC_CRITICAL&group_name=SITE-A");
        let pipeline = QueryBuilder::new(SITES).build(&f, Granularity::Daily).to_pipeline().unwrap();
        assert_eq!(pipeline.len(), 3);
        assert_eq!(
            pipeline[0],
            doc! { "$match": {
                "dt": { "$gte": 20150620_i64, "$lte": 20150623_i64 },
                "ap": "ch.cern.sam.ROC_CRITICAL",
                "s": { "$in": ["SITE-A"] },
            }}
        );
        assert_eq!(pipeline[2], doc! { "$sort": { "ap": 1, "n": 1, "s": 1, "dt": 1 } });
    }

    #[test]
    fn monthly_pipeline_groups_then_sorts_by_namespace_first() {
        let f = filter("start_time=2015-06-01T00:00:00Z&end_time=2015-07-31T00:00:00Z");
        let plan = QueryBuilder::new(NGIS).build(&f, Granularity::Monthly);
        let pipeline = plan.to_pipeline().unwrap();
        assert_eq!(pipeline.len(), 4);
        assert!(pipeline[1].contains_key("$group"));
        assert!(pipeline[2].contains_key("$project"));
        assert_eq!(pipeline[3], doc! { "$sort": { "ns": 1, "ap": 1, "n": 1, "dt": 1 } });
    }

    #[test]
    fn no_group_names_means_no_group_clause() {
        let f = filter("start_time=2015-06-01T00:00:00Z&end_time=2015-06-02T00:00:00Z");
        let plan = QueryBuilder::new(SITES).build(&f, Granularity::Daily);
        let columns: Vec<_> = match_conditions(&plan).conditions().iter().map(|c| c.column.as_str()).collect();
        assert_eq!(columns, vec!["dt"]);
    }

    #[test]
    fn empty_flag_still_filters() {
        let f = filter("start_time=2015-06-01T00:00:00Z&end_time=2015-06-02T00:00:00Z&production=");
        let plan = QueryBuilder::new(SITES).build(&f, Granularity::Daily);
        let production = match_conditions(&plan)
            .conditions()
            .iter()
            .find(|c| c.column == PRODUCTION)
            .expect("production clause");
        assert_eq!(production.operator, FilterOp::Eq);
        assert_eq!(production.data, serde_json::json!(""));
    }

    #[test]
    fn flags_are_ignored_outside_sites() {
        let f = filter("start_time=2015-06-01T00:00:00Z&end_time=2015-06-02T00:00:00Z&production=Y");
        let plan = QueryBuilder::new(VOS).build(&f, Granularity::Daily);
        assert_eq!(match_conditions(&plan).conditions().len(), 1);
    }

    #[test]
    fn flavor_filter_applies_to_service_flavors() {
        let f = filter("start_time=2015-06-01T00:00:00Z&end_time=2015-06-02T00:00:00Z&flavor=CREAM-CE&flavor=SRMv2");
        let plan = QueryBuilder::new(SERVICE_FLAVORS).build(&f, Granularity::Daily);
        let flavor = match_conditions(&plan)
            .conditions()
            .iter()
            .find(|c| c.column == "sf")
            .expect("flavor clause");
        assert_eq!(flavor.data, serde_json::json!(["CREAM-CE", "SRMv2"]));
    }

    #[test]
    fn status_query_picks_group_field() {
        let query = StatusQuery {
            start_time: "2015-05-01T00:00:00Z".into(),
            end_time: "2015-05-01T23:00:00Z".into(),
            profile: "ch.cern.sam.ROC_CRITICAL".into(),
            group_type: "ngi".into(),
            group: "NGI_GRNET".into(),
        };
        let pipeline = query.build().to_pipeline().unwrap();
        assert_eq!(
            pipeline[0],
            doc! { "$match": {
                "p": "ch.cern.sam.ROC_CRITICAL",
                "roc": "NGI_GRNET",
                "ts": { "$gte": "2015-05-01T00:00:00Z", "$lte": "2015-05-01T23:00:00Z" },
            }}
        );
    }

    #[test]
    fn metric_result_keys_on_date_and_time_integers() {
        let query = metric_result_query("cream01.grid.auth.gr", "emi.cream.CREAMCE-JobSubmit", "2015-05-01T01:00:00Z");
        assert_eq!(
            query.to_document().unwrap(),
            doc! {
                "date_integer": 20150501_i64,
                "host": "cream01.grid.auth.gr",
                "metric": "emi.cream.CREAMCE-JobSubmit",
                "time_integer": 10000_i64,
            }
        );
    }
}
