use crate::{
    record::InputRow,
    spec::{LoadSpec, Metric},
    time::parse_instant,
};

pub(crate) fn spec(dimensions: &[&str], metrics: &[(&str, &str)]) -> LoadSpec {
    LoadSpec::new(
        dimensions.iter().map(|d| d.to_string()).collect(),
        metrics
            .iter()
            .map(|(name, ty)| Metric::new(*name, *ty))
            .collect(),
    )
    .unwrap()
}

pub(crate) fn row_at(timestamp: &str) -> InputRow {
    InputRow::new(parse_instant(timestamp).unwrap())
}
