use postergen::{logger, Config, PosterStudio};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_config_info(&config);

    if config.image_api.api_key.is_none() {
        log::error!("❌ IMAGEGEN_API_KEY is not set, image generation will fail");
    }

    log::info!("🔄 Creating studio...");
    let studio = match PosterStudio::from_config(&config).await {
        Ok(studio) => {
            log::info!(
                "✅ Studio ready with {} image providers",
                studio.registry().len()
            );
            studio
        }
        Err(e) => {
            log::error!("❌ Failed to initialize studio: {}", e);
            return Err(e.into());
        }
    };

    #[cfg(feature = "server")]
    {
        let port = config.port();
        logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), port);
        postergen::server::run(studio, port).await?;
        Ok(())
    }

    #[cfg(not(feature = "server"))]
    {
        run_once(&studio).await
    }
}

/// `postergen "<prompt>" [aspect-ratio] [count]`: generates once and writes
/// the images to the working directory.
#[cfg(not(feature = "server"))]
async fn run_once(studio: &PosterStudio) -> Result<(), Box<dyn std::error::Error>> {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use postergen::{AspectRatio, GenerationRequest};
    use std::{env, fs};

    let mut args = env::args().skip(1);
    let prompt = args
        .next()
        .unwrap_or_else(|| "A serene landscape with mountains and a lake at sunset".to_string());
    let aspect_ratio: AspectRatio = match args.next() {
        Some(ratio) => ratio.parse()?,
        None => AspectRatio::Square,
    };
    let count: u32 = match args.next() {
        Some(count) => count.parse()?,
        None => 1,
    };

    let request = GenerationRequest::new(prompt, aspect_ratio, count);
    log::info!("🎨 Generating for request {}: {}", request.id(), request.prompt());

    match studio.generate_images(&request).await {
        Ok(outcome) => {
            log::info!(
                "✅ {} image(s) from {}",
                outcome.images.len(),
                outcome.provider_used
            );
            for (i, image) in outcome.images.iter().enumerate() {
                let extension = image.mime_type.rsplit('/').next().unwrap_or("bin");
                let filename = format!("{}_{}.{}", outcome.request_id, i, extension);
                fs::write(&filename, STANDARD.decode(&image.data)?)?;
                log::info!("💾 Saved {} ({} bytes)", filename, image.byte_len);
            }
            Ok(())
        }
        Err(e) => {
            log::error!("❌ Generation failed: {}", e);
            if let Some(attempts) = e.attempts() {
                for attempt in attempts {
                    log::error!(
                        "   tier {} {}: {} ({})",
                        attempt.tier,
                        attempt.provider,
                        attempt.kind,
                        attempt.message
                    );
                }
            }
            log::warn!("💡 {}", e.public_message());
            Err(e.into())
        }
    }
}
