pub const TITLE_TEXT: &str = r#"
 _____ _
|  ___| | __ _ _ __  _ __  _   _
| |_  | |/ _` | '_ \| '_ \| | | |
|  _| | | (_| | |_) | |_) | |_| |
|_|   |_|\__,_| .__/| .__/ \__, |
              |_|   |_|    |___/
"#;

pub const OPTION_PADDING: u16 = 2;
