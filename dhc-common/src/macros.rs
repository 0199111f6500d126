#[macro_export]
macro_rules! client {
    () => {{
        $crate::reqwest::Client::builder()
            .user_agent($crate::user_agent())
            .build()
            .unwrap()
    }};
}
