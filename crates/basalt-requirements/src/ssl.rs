//! SSL server requirements (SRS-034).
//!
//! Generated from the Basalt SSL server software requirements
//! specification; regenerate rather than editing by hand.

use crate::Requirement;

pub static RQ_SRS_034_BASALT_SSL_SERVER: Requirement = Requirement {
    name: "RQ.SRS-034.Basalt.SslServer",
    version: "1.0",
    description: "[Basalt] SHALL support accepting only secure connections when \
                  configured with a server certificate and private key.",
    level: 3,
    num: "4.1.1",
};

pub static RQ_SRS_034_BASALT_SSL_SERVER_KEYSTORE_GENERATE_KEY_PAIR: Requirement = Requirement {
    name: "RQ.SRS-034.Basalt.SslServer.Keystore.GenerateKeyPair",
    version: "1.0",
    description: "[Basalt] SHALL support provisioning a JKS keystore with a generated \
                  key pair for the coordination service.",
    level: 3,
    num: "4.2.1",
};

pub static RQ_SRS_034_BASALT_SSL_SERVER_TRUSTSTORE_IMPORT_CERTIFICATE: Requirement = Requirement {
    name: "RQ.SRS-034.Basalt.SslServer.Truststore.ImportCertificate",
    version: "1.0",
    description: "[Basalt] SHALL support importing a signed certificate into the \
                  coordination service truststore.",
    level: 3,
    num: "4.2.2",
};

pub static RQ_SRS_034_BASALT_SSL_SERVER_ZOOKEEPER_SECURE_CLIENT_PORT: Requirement = Requirement {
    name: "RQ.SRS-034.Basalt.SslServer.ZooKeeper.SecureClientPort",
    version: "1.0",
    description: "[Basalt] SHALL support connecting to the coordination service over \
                  its secure client port when secureClientPort is configured.",
    level: 3,
    num: "4.3.1",
};

pub static SSL: &[&Requirement] = &[
    &RQ_SRS_034_BASALT_SSL_SERVER,
    &RQ_SRS_034_BASALT_SSL_SERVER_KEYSTORE_GENERATE_KEY_PAIR,
    &RQ_SRS_034_BASALT_SSL_SERVER_TRUSTSTORE_IMPORT_CERTIFICATE,
    &RQ_SRS_034_BASALT_SSL_SERVER_ZOOKEEPER_SECURE_CLIENT_PORT,
];
