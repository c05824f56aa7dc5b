//! Host commands

use regild_core::{
    AddonPermission, ExtensionDescriptor, ExtensionEvent, ExtensionHost, ExtensionModule,
    InertModule, PermissionService, StaticModuleLoader,
};
use regild_foundation::HostConfig;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

/// 네이티브 모듈이 없는 애드온은 메타데이터만으로 동작
fn module_loader() -> Arc<StaticModuleLoader> {
    Arc::new(StaticModuleLoader::new().with_fallback(|source, _| {
        info!(extension = %source.id, "No native module registered; running metadata-only");
        Ok(Arc::new(InertModule) as Arc<dyn ExtensionModule>)
    }))
}

/// Start the host and keep it running until Ctrl-C
pub async fn run(config: HostConfig) -> anyhow::Result<()> {
    let mut host = ExtensionHost::new(config, module_loader())?;
    let events = host.events().subscribe();
    host.start().await?;

    let printer = tokio::spawn(print_events(events));

    if host.is_watching() {
        println!("Watching for changes. Press Ctrl-C to stop.");
        tokio::signal::ctrl_c().await?;
    }

    host.shutdown().await;
    printer.abort();
    Ok(())
}

/// 버스가 닫힐 때까지 이벤트 출력 (뒤처지면 건너뛰고 계속)
///
/// 반환값: 출력한 이벤트 수
async fn print_events(mut events: broadcast::Receiver<ExtensionEvent>) -> usize {
    let mut printed = 0;
    loop {
        match events.recv().await {
            Ok(event) => {
                print_event(&event);
                printed += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Event printer lagged; {} event(s) skipped", skipped);
            }
            Err(RecvError::Closed) => return printed,
        }
    }
}

fn print_event(event: &ExtensionEvent) {
    println!(
        "[{}] {:<16} {}",
        event.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S"),
        event.kind.to_string(),
        event.extension_id
    );
}

/// List discovered addons and themes
pub async fn list(mut config: HostConfig) -> anyhow::Result<()> {
    config.watch = Some(false);
    let mut host = ExtensionHost::new(config, module_loader())?;
    host.start().await?;

    let addons = host.addons();
    print_section("Addons", &addons.get_all(), |id| {
        (addons.is_enabled(id), addons.is_loaded(id))
    });
    let themes = host.themes();
    print_section("Themes", &themes.get_all(), |id| {
        (themes.is_enabled(id), themes.is_loaded(id))
    });

    host.shutdown().await;
    Ok(())
}

fn print_section<F>(title: &str, descriptors: &[Arc<ExtensionDescriptor>], state: F)
where
    F: Fn(&str) -> (bool, bool),
{
    println!("\n{} ({})", title, descriptors.len());
    println!("{:<24} {:<28} {:<8} {:<8}", "ID", "Name", "Enabled", "Loaded");
    println!("{}", "-".repeat(70));
    for descriptor in descriptors {
        let (enabled, loaded) = state(&descriptor.id);
        println!(
            "{:<24} {:<28} {:<8} {:<8}",
            descriptor.id,
            descriptor.name,
            if enabled { "yes" } else { "no" },
            if loaded { "yes" } else { "no" }
        );
    }
}

/// Show or change an extension's permission mask
pub fn permissions(
    config: &HostConfig,
    id: &str,
    set: Option<u32>,
    grant: &[String],
    revoke: &[String],
) -> anyhow::Result<()> {
    let service = PermissionService::load(config.data_dir()?)?;

    if let Some(bits) = set {
        service.set_permissions(id, AddonPermission::from_bits(bits))?;
    }
    for name in grant {
        service.grant(id, parse_flag(name)?)?;
    }
    for name in revoke {
        service.revoke(id, parse_flag(name)?)?;
    }

    println!("{}: {}", id, service.get_permissions(id));
    Ok(())
}

fn parse_flag(name: &str) -> anyhow::Result<AddonPermission> {
    AddonPermission::from_name(name).ok_or_else(|| {
        warn!("Unknown permission '{}'", name);
        anyhow::anyhow!(
            "unknown permission '{}' (expected one of: {})",
            name,
            AddonPermission::ALL.names().join(", ")
        )
    })
}

/// Print the rendered style tree
pub async fn render(mut config: HostConfig) -> anyhow::Result<()> {
    config.watch = Some(false);
    let mut host = ExtensionHost::new(config, module_loader())?;
    host.start().await?;
    println!("{}", host.styles().render());
    host.shutdown().await;
    Ok(())
}
