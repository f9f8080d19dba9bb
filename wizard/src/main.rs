use anyhow::Context;
use app::{Message, PlanWizard};
use iced::{event, window, Event, Subscription, Theme};
use log::info;
use plancore::config::ClientConfig;
use plancore::export::DirectorySaver;
use plancore::HttpGateway;
use views::upload::UploadMessage;

mod app;
mod canvas;
mod views;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ClientConfig::from_env().context("resolving client config")?;
    let saver = DirectorySaver::from_config(&config);
    let gateway = HttpGateway::new(config).context("building HTTP client")?;
    info!(
        "backend at {}, downloads go to {}",
        gateway.config().base_url,
        saver.dir().display()
    );

    iced::application(
        move || PlanWizard::boot(gateway.clone(), saver.clone()),
        PlanWizard::update,
        PlanWizard::view,
    )
    .title(application_title)
    .subscription(application_subscription)
    .theme(application_theme)
    .run()?;
    Ok(())
}

fn application_title(_: &PlanWizard) -> String {
    "AI Floor Plan Generator".into()
}

// Window-level drag and drop feeds the upload step.
fn application_subscription(_: &PlanWizard) -> Subscription<Message> {
    event::listen_with(|event, _status, _window| match event {
        Event::Window(window::Event::FileHovered(_)) => {
            Some(Message::Upload(UploadMessage::FileHovered))
        }
        Event::Window(window::Event::FileDropped(path)) => {
            Some(Message::Upload(UploadMessage::FileDropped(path)))
        }
        Event::Window(window::Event::FilesHoveredLeft) => {
            Some(Message::Upload(UploadMessage::HoverLeft))
        }
        _ => None,
    })
}

fn application_theme(_: &PlanWizard) -> Theme {
    Theme::Dark
}
