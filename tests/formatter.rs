use ayurbot_chat::formatter::format_message;

#[test]
fn plain_text_gains_only_a_line_break() {
    for text in ["Namaste", "Sleep by 10pm.", "a - b * c"] {
        assert_eq!(format_message(Some(text)), format!("{text}<br>"));
    }
}

#[test]
fn typical_bot_reply_renders_structure() {
    let reply = "**Morning routine for Vata**\n\
                 - Wake before sunrise\n\
                 - Warm sesame oil massage\n\
                 \n\
                 **Evening**\n\
                 * Light dinner\n";
    assert_eq!(
        format_message(Some(reply)),
        "<b>Morning routine for Vata</b><br>\
         <ul><li>Wake before sunrise</li><li>Warm sesame oil massage</li></ul>\
         <b>Evening</b><br>\
         <ul><li>Light dinner</li></ul>"
    );
}

#[test]
fn windows_line_endings_are_trimmed() {
    assert_eq!(
        format_message(Some("- a\r\n- b\r\nok\r\n")),
        "<ul><li>a</li><li>b</li></ul>ok<br>"
    );
}
