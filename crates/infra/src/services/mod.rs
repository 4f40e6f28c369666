mod notification;

pub use notification::{
    HttpEmailSender, INotificationSender, LogNotificationSender, NotificationChannel,
};
