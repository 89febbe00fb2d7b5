//! Aggregate function requirements (SRS-031).
//!
//! Generated from the Basalt aggregate functions software requirements
//! specification; regenerate rather than editing by hand.

use crate::Requirement;

pub static RQ_SRS_031_BASALT_AGGREGATE_FUNCTIONS: Requirement = Requirement {
    name: "RQ.SRS-031.Basalt.AggregateFunctions",
    version: "1.0",
    description: "[Basalt] SHALL support aggregate functions over all supported data \
                  types, with NULL values skipped during aggregation.",
    level: 3,
    num: "4.1.1",
};

pub static RQ_SRS_031_BASALT_AGGREGATE_FUNCTIONS_STANDARD_MIN: Requirement = Requirement {
    name: "RQ.SRS-031.Basalt.AggregateFunctions.Standard.Min",
    version: "1.0",
    description: "[Basalt] SHALL support the min() standard aggregate function.",
    level: 3,
    num: "4.2.1",
};

pub static RQ_SRS_031_BASALT_AGGREGATE_FUNCTIONS_SPECIFIC_ARG_MIN: Requirement = Requirement {
    name: "RQ.SRS-031.Basalt.AggregateFunctions.Specific.ArgMin",
    version: "1.0",
    description: "[Basalt] SHALL support the argMin() specific aggregate function, \
                  returning the value of the first argument at the minimum of the second.",
    level: 3,
    num: "4.3.1",
};

pub static AGGREGATES: &[&Requirement] = &[
    &RQ_SRS_031_BASALT_AGGREGATE_FUNCTIONS,
    &RQ_SRS_031_BASALT_AGGREGATE_FUNCTIONS_STANDARD_MIN,
    &RQ_SRS_031_BASALT_AGGREGATE_FUNCTIONS_SPECIFIC_ARG_MIN,
];
