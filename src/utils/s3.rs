use aws_config::BehaviorVersion;
use aws_config::ConfigLoader;
use aws_sdk_s3::config::{Builder as S3ConfigBuilder, Credentials};
use aws_sdk_s3::Client as S3Client;
use aws_types::region::Region;

use crate::config::S3Settings;

pub async fn create_s3_client(settings: &S3Settings) -> S3Client {
    let credentials = Credentials::new(
        settings.access_key_id.clone(),
        settings.secret_access_key.clone(),
        None,
        None,
        "image-dashboard",
    );

    let mut loader = ConfigLoader::default()
        .region(Region::new(settings.region.clone()))
        .credentials_provider(credentials)
        .behavior_version(BehaviorVersion::latest());
    if let Some(endpoint) = &settings.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    let aws_config = loader.load().await;

    // Custom endpoints (MinIO, R2, ...) generally need path-style addressing.
    let s3_config = S3ConfigBuilder::from(&aws_config)
        .force_path_style(settings.endpoint_url.is_some())
        .build();

    S3Client::from_conf(s3_config)
}
