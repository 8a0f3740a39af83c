use std::cmp::Ordering;

use mongodb::bson::Document as BsonDocument;
use serde_json::{Map, Value};

use super::filter_where::lookup;
use super::types::{compare_values, FilterOrderInfo};

pub struct FilterOrder;

impl FilterOrder {
    /// `$sort` body. Key order is significant, so this is built as an
    /// ordered BSON document.
    pub fn generate(infos: &[FilterOrderInfo]) -> BsonDocument {
        let mut sort = BsonDocument::new();
        for info in infos {
            sort.insert(info.column.clone(), 1_i32);
        }
        sort
    }

    /// Multi-key ascending comparison; missing fields compare as null
    pub fn compare(infos: &[FilterOrderInfo], a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
        for info in infos {
            let left = lookup(a, &info.column).into_iter().next().unwrap_or(&Value::Null);
            let right = lookup(b, &info.column).into_iter().next().unwrap_or(&Value::Null);
            let ord = compare_values(left, right);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde_json::json;

    fn keys(columns: &[&str]) -> Vec<FilterOrderInfo> {
        columns.iter().map(|c| FilterOrderInfo::asc(*c)).collect()
    }

    #[test]
    fn sort_document_keeps_key_order() {
        assert_eq!(FilterOrder::generate(&keys(&["ap", "n", "dt"])), doc! { "ap": 1, "n": 1, "dt": 1 });
    }

    #[test]
    fn compares_key_by_key() {
        let infos = keys(&["n", "s"]);
        let a = json!({"n": "NGI_A", "s": "Z"});
        let b = json!({"n": "NGI_B", "s": "A"});
        let (Value::Object(a), Value::Object(b)) = (a, b) else { unreachable!() };
        assert_eq!(FilterOrder::compare(&infos, &a, &b), Ordering::Less);
        assert_eq!(FilterOrder::compare(&infos, &b, &a), Ordering::Greater);
    }
}
