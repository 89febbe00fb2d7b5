//! Parquet format requirements (SRS-032).
//!
//! Generated from the Basalt Parquet software requirements
//! specification; regenerate rather than editing by hand.

use crate::Requirement;

pub static RQ_SRS_032_BASALT_PARQUET: Requirement = Requirement {
    name: "RQ.SRS-032.Basalt.Parquet",
    version: "1.0",
    description: "[Basalt] SHALL support the Parquet data format.",
    level: 3,
    num: "4.1.1",
};

pub static RQ_SRS_032_BASALT_PARQUET_IMPORT: Requirement = Requirement {
    name: "RQ.SRS-032.Basalt.Parquet.Import",
    version: "1.0",
    description: "[Basalt] SHALL support importing from Parquet files through the \
                  file() table function and through CREATE TABLE AS SELECT.",
    level: 3,
    num: "4.2.1",
};

pub static RQ_SRS_032_BASALT_PARQUET_IMPORT_GLOB: Requirement = Requirement {
    name: "RQ.SRS-032.Basalt.Parquet.Import.Glob",
    version: "1.0",
    description: "[Basalt] SHALL support glob patterns when selecting Parquet files, \
                  including `*`, `**`, `?`, and `{n..m}` range expansion.",
    level: 3,
    num: "4.2.2",
};

pub static RQ_SRS_032_BASALT_PARQUET_IMPORT_GLOB_MULTI_DIRECTORY: Requirement = Requirement {
    name: "RQ.SRS-032.Basalt.Parquet.Import.Glob.MultiDirectory",
    version: "1.0",
    description: "[Basalt] SHALL support glob patterns that traverse multiple nested \
                  directories when selecting Parquet files.",
    level: 3,
    num: "4.2.3",
};

pub static PARQUET: &[&Requirement] = &[
    &RQ_SRS_032_BASALT_PARQUET,
    &RQ_SRS_032_BASALT_PARQUET_IMPORT,
    &RQ_SRS_032_BASALT_PARQUET_IMPORT_GLOB,
    &RQ_SRS_032_BASALT_PARQUET_IMPORT_GLOB_MULTI_DIRECTORY,
];
