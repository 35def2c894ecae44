use pulldown_cmark::{Event, Options, Parser, html};

use crate::error::Result;

use super::Renderer;

/// 本地 CommonMark 渲染器
///
/// 启用表格和删除线，软换行按硬换行输出，与编辑器中的所见一致。
#[derive(Debug, Default, Clone, Copy)]
pub struct CmarkRenderer;

impl CmarkRenderer {
    pub fn render_html(&self, content: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let parser = Parser::new_ext(content, options).map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            event => event,
        });

        let mut out = String::with_capacity(content.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

impl Renderer for CmarkRenderer {
    async fn render<T: AsRef<str> + Send>(&self, content: T) -> Result<String> {
        Ok(self.render_html(content.as_ref()))
    }
}
