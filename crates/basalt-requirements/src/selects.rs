//! SELECT query requirements (SRS-030).
//!
//! Generated from the Basalt SELECT queries software requirements
//! specification; regenerate rather than editing by hand.

use crate::Requirement;

pub static RQ_SRS_030_BASALT_SELECTS_FINAL_MODIFIER: Requirement = Requirement {
    name: "RQ.SRS-030.Basalt.Selects.FinalModifier",
    version: "1.0",
    description: "[Basalt] SHALL support the FINAL modifier on SELECT queries over \
                  table engines that collapse rows on merge, returning fully merged data.",
    level: 3,
    num: "4.1.1",
};

pub static RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL: Requirement = Requirement {
    name: "RQ.SRS-030.Basalt.Selects.ForceFinal",
    version: "1.0",
    description: "[Basalt] SHALL apply the FINAL modifier to every eligible table in a \
                  SELECT query when the force_select_final setting is 1, producing output \
                  identical to the same query with explicit FINAL.",
    level: 3,
    num: "4.2.1",
};

pub static RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_COUNT: Requirement = Requirement {
    name: "RQ.SRS-030.Basalt.Selects.ForceFinal.Count",
    version: "1.0",
    description: "[Basalt] SHALL support the force_select_final setting for SELECT \
                  queries with the count() aggregate.",
    level: 3,
    num: "4.3.1",
};

pub static RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_LIMIT: Requirement = Requirement {
    name: "RQ.SRS-030.Basalt.Selects.ForceFinal.Limit",
    version: "1.0",
    description: "[Basalt] SHALL support the force_select_final setting for SELECT \
                  queries with a LIMIT clause.",
    level: 3,
    num: "4.3.2",
};

pub static RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_GROUP_BY: Requirement = Requirement {
    name: "RQ.SRS-030.Basalt.Selects.ForceFinal.GroupBy",
    version: "1.0",
    description: "[Basalt] SHALL support the force_select_final setting for SELECT \
                  queries with a GROUP BY clause.",
    level: 3,
    num: "4.3.3",
};

pub static RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_DISTINCT: Requirement = Requirement {
    name: "RQ.SRS-030.Basalt.Selects.ForceFinal.Distinct",
    version: "1.0",
    description: "[Basalt] SHALL support the force_select_final setting for SELECT \
                  DISTINCT queries.",
    level: 3,
    num: "4.3.4",
};

pub static RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_WHERE: Requirement = Requirement {
    name: "RQ.SRS-030.Basalt.Selects.ForceFinal.Where",
    version: "1.0",
    description: "[Basalt] SHALL support the force_select_final setting for SELECT \
                  queries with a WHERE clause.",
    level: 3,
    num: "4.3.5",
};

pub static RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_JOIN: Requirement = Requirement {
    name: "RQ.SRS-030.Basalt.Selects.ForceFinal.Join",
    version: "1.0",
    description: "[Basalt] SHALL support the force_select_final setting for SELECT \
                  queries joining eligible tables, for every supported join strategy, \
                  including joins against subqueries.",
    level: 3,
    num: "4.4.1",
};

pub static RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_UNION: Requirement = Requirement {
    name: "RQ.SRS-030.Basalt.Selects.ForceFinal.Union",
    version: "1.0",
    description: "[Basalt] SHALL support the force_select_final setting for SELECT \
                  queries combining arms with UNION ALL or UNION DISTINCT.",
    level: 3,
    num: "4.5.1",
};

pub static RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_WITH: Requirement = Requirement {
    name: "RQ.SRS-030.Basalt.Selects.ForceFinal.With",
    version: "1.0",
    description: "[Basalt] SHALL support the force_select_final setting for SELECT \
                  queries with a WITH clause, including scalar subquery expressions.",
    level: 3,
    num: "4.6.1",
};

pub static SELECTS: &[&Requirement] = &[
    &RQ_SRS_030_BASALT_SELECTS_FINAL_MODIFIER,
    &RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL,
    &RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_COUNT,
    &RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_LIMIT,
    &RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_GROUP_BY,
    &RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_DISTINCT,
    &RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_WHERE,
    &RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_JOIN,
    &RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_UNION,
    &RQ_SRS_030_BASALT_SELECTS_FORCE_FINAL_WITH,
];
