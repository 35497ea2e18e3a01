//! Connection-endpoint deployment: classification of endpoint candidates,
//! configurator merge policy and registration into the server.

pub mod initializer;
pub mod merger;

pub use initializer::{
    ENDPOINT_INITIALIZER, ENDPOINT_TYPE, EndpointInitializer, SERVER_APPLICATION_CONFIG,
    SERVER_ENDPOINT,
};
pub use merger::{
    EndpointCandidates, FinalRegistrationSet, auto_deploy_when_no_configurator,
    drop_unclaimed_when_configurator_present, merge_endpoint_configuration,
};
