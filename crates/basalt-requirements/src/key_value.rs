//! extractKeyValuePairs requirements (SRS-033).
//!
//! Generated from the Basalt key-value extraction software requirements
//! specification; regenerate rather than editing by hand.

use crate::Requirement;

pub static RQ_SRS_033_BASALT_EXTRACT_KEY_VALUE_PAIRS: Requirement = Requirement {
    name: "RQ.SRS-033.Basalt.ExtractKeyValuePairs",
    version: "1.0",
    description: "[Basalt] SHALL support the extractKeyValuePairs function, returning \
                  a map of the key value pairs parsed from the input string.",
    level: 3,
    num: "4.1.1",
};

pub static RQ_SRS_033_BASALT_EXTRACT_KEY_VALUE_PAIRS_INPUT_COLUMN: Requirement = Requirement {
    name: "RQ.SRS-033.Basalt.ExtractKeyValuePairs.InputDataSource.Column",
    version: "1.0",
    description: "[Basalt] SHALL support using a table column as the input data source \
                  of the extractKeyValuePairs function.",
    level: 3,
    num: "4.2.1",
};

pub static RQ_SRS_033_BASALT_EXTRACT_KEY_VALUE_PAIRS_NOISE: Requirement = Requirement {
    name: "RQ.SRS-033.Basalt.ExtractKeyValuePairs.Noise",
    version: "1.0",
    description: "[Basalt] SHALL support input values that contain noise and special \
                  characters between key value pairs.",
    level: 3,
    num: "4.3.1",
};

pub static KEY_VALUE: &[&Requirement] = &[
    &RQ_SRS_033_BASALT_EXTRACT_KEY_VALUE_PAIRS,
    &RQ_SRS_033_BASALT_EXTRACT_KEY_VALUE_PAIRS_INPUT_COLUMN,
    &RQ_SRS_033_BASALT_EXTRACT_KEY_VALUE_PAIRS_NOISE,
];
