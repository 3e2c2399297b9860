//! `%name%` 参数占位符解析

/// 模板片段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// 普通文本
    Text(&'a str),
    /// `%%` 转义出的字面量 `%`
    Percent,
    /// `%name%` 占位符
    Placeholder(&'a str),
}

/// 把模板拆分为片段
///
/// 占位符名称不能为空、不能包含空白；不能组成占位符的 `%` 按普通文本处理
pub(crate) fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        if pos > 0 {
            segments.push(Segment::Text(&rest[..pos]));
        }
        let after = &rest[pos + 1..];
        if let Some(stripped) = after.strip_prefix('%') {
            segments.push(Segment::Percent);
            rest = stripped;
            continue;
        }
        match after.find('%') {
            Some(end) if !after[..end].chars().any(char::is_whitespace) => {
                segments.push(Segment::Placeholder(&after[..end]));
                rest = &after[end + 1..];
            }
            _ => {
                segments.push(Segment::Text("%"));
                rest = after;
            }
        }
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    segments
}

/// 模板中引用的参数名称
pub(crate) fn placeholder_names(template: &str) -> Vec<&str> {
    segments(template)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name),
            _ => None,
        })
        .collect()
}
