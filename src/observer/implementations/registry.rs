// Helper for registering the marketplace observers
use crate::config::NotificationConfig;
use crate::observer::pipeline::NotificationDispatcher;
use super::{EmailPlaceholder, NotifyFreelancers, NotifyMessageReceiver, NotifyProjectOwner, NotifyReviewee};

/// Register every notification observer, plus the e-mail placeholder when enabled
pub fn register_default_observers(dispatcher: &mut NotificationDispatcher, config: &NotificationConfig) {
    if config.email_placeholder {
        dispatcher.register_observer(Box::new(EmailPlaceholder));
    }
    dispatcher.register_observer(Box::new(NotifyFreelancers));
    dispatcher.register_observer(Box::new(NotifyProjectOwner));
    dispatcher.register_observer(Box::new(NotifyMessageReceiver));
    dispatcher.register_observer(Box::new(NotifyReviewee));
}
