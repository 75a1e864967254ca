//! Builtin Category Definitions
//!
//! The bundled rule table. Order is significant: the classifier stops at the
//! first main category (and then the first subcategory) that matches.

/// Category used when no rule matches.
pub const DEFAULT_CATEGORY: &str = "其他";

/// Subcategory label used in statistics for bookmarks filed directly under a
/// main category.
pub const UNGROUPED_LABEL: &str = "未分组";

/// Category for bookmarks an LLM response left out.
pub const UNCATEGORIZED: &str = "未分类";

/// Static definition of a main category.
#[derive(Debug, Clone)]
pub struct BuiltinCategory {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub domains: &'static [&'static str],
    pub url_patterns: &'static [&'static str],
    pub subcategories: &'static [BuiltinSubcategory],
}

/// Static definition of a subcategory.
#[derive(Debug, Clone)]
pub struct BuiltinSubcategory {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub domains: &'static [&'static str],
}

pub const BUILTIN_CATEGORIES: &[BuiltinCategory] = &[
    BuiltinCategory {
        name: "技术学习",
        keywords: &[
            "github",
            "stackoverflow",
            "csdn",
            "juejin",
            "segmentfault",
            "v2ex",
            "cnblogs",
            "zhihu",
        ],
        domains: &[
            "github.com",
            "stackoverflow.com",
            "juejin.cn",
            "segmentfault.com",
            "v2ex.com",
            "cnblogs.com",
            "zhihu.com",
            "zhuanlan.zhihu.com",
        ],
        url_patterns: &["blog", "tutorial", "doc", "api", "guide"],
        subcategories: &[
            BuiltinSubcategory {
                name: "掘金",
                keywords: &["juejin"],
                domains: &["juejin.cn"],
            },
            BuiltinSubcategory {
                name: "V2EX",
                keywords: &["v2ex"],
                domains: &["v2ex.com"],
            },
            BuiltinSubcategory {
                name: "知乎",
                keywords: &["zhihu"],
                domains: &["zhihu.com", "zhuanlan.zhihu.com"],
            },
            BuiltinSubcategory {
                name: "前端开发",
                keywords: &[
                    "react",
                    "vue",
                    "javascript",
                    "js",
                    "css",
                    "html",
                    "webpack",
                    "vite",
                    "npm",
                    "typescript",
                    "ts",
                    "tailwind",
                    "next",
                    "nuxt",
                ],
                domains: &[
                    "react.dev",
                    "vuejs.org",
                    "developer.mozilla.org",
                    "css-tricks.com",
                    "tailwindcss.com",
                ],
            },
            BuiltinSubcategory {
                name: "后端开发",
                keywords: &[
                    "java", "python", "go", "golang", "spring", "django", "flask", "node",
                    "express", "nest",
                ],
                domains: &["spring.io", "django", "golang.org", "nodejs.org"],
            },
            BuiltinSubcategory {
                name: "数据库",
                keywords: &["mysql", "mongodb", "redis", "postgresql", "sql", "database"],
                domains: &["mongodb.com", "redis.io", "postgresql.org"],
            },
            BuiltinSubcategory {
                name: "运维/DevOps",
                keywords: &[
                    "docker",
                    "kubernetes",
                    "k8s",
                    "nginx",
                    "jenkins",
                    "gitlab",
                    "ci/cd",
                    "devops",
                ],
                domains: &["kubernetes.io", "docker.com", "nginx.com"],
            },
            BuiltinSubcategory {
                name: "代码仓库",
                keywords: &["github", "gitlab", "gitee", "repository"],
                domains: &["github.com", "gitlab.com", "gitee.com"],
            },
        ],
    },
    BuiltinCategory {
        name: "工作相关",
        keywords: &["feishu", "nio", "confluence", "jira", "wiki"],
        domains: &["feishu.cn", "nioint.com", "nevint.com"],
        url_patterns: &[],
        subcategories: &[
            BuiltinSubcategory {
                name: "飞书文档",
                keywords: &[],
                domains: &["feishu.cn"],
            },
            BuiltinSubcategory {
                name: "内部系统",
                keywords: &[],
                domains: &["nioint.com", "nevint.com"],
            },
        ],
    },
    BuiltinCategory {
        name: "设计资源",
        keywords: &[
            "design", "ui", "ux", "figma", "color", "icon", "font", "dribbble", "behance",
        ],
        domains: &[
            "dribbble.com",
            "behance.net",
            "figma.com",
            "framer.com",
            "pinterest.com",
        ],
        url_patterns: &[],
        subcategories: &[
            BuiltinSubcategory {
                name: "UI组件库",
                keywords: &[
                    "component",
                    "ui",
                    "antd",
                    "element",
                    "material",
                    "chakra",
                    "radix",
                    "shadcn",
                ],
                domains: &["mui.com", "ant.design", "chakra-ui.com", "radix-ui.com"],
            },
            BuiltinSubcategory {
                name: "图标字体",
                keywords: &["icon", "font", "iconfont"],
                domains: &[
                    "iconfont.cn",
                    "fontawesome.com",
                    "iconpark.oceanengine.com",
                ],
            },
            BuiltinSubcategory {
                name: "配色工具",
                keywords: &["color", "palette"],
                domains: &["nipponcolors.com", "zhongguose.com", "colordesigner.io"],
            },
        ],
    },
    BuiltinCategory {
        name: "工具软件",
        keywords: &["tool", "converter", "editor", "generator", "online"],
        domains: &["stackoverflow.com"],
        url_patterns: &[],
        subcategories: &[
            BuiltinSubcategory {
                name: "在线工具",
                keywords: &["online", "convert", "editor", "generator"],
                domains: &[
                    "carbon.now.sh",
                    "excalidraw.com",
                    "processon.com",
                    "tinypng.com",
                ],
            },
            BuiltinSubcategory {
                name: "开发工具",
                keywords: &["stackblitz", "codesandbox", "playground", "repl"],
                domains: &["stackblitz.com", "codesandbox.io", "replit.com"],
            },
        ],
    },
    BuiltinCategory {
        name: "资讯媒体",
        keywords: &["news", "medium", "blog"],
        domains: &[
            "medium.com",
            "mp.weixin.qq.com",
            "sspai.com",
            "tophub.today",
        ],
        url_patterns: &[],
        subcategories: &[
            BuiltinSubcategory {
                name: "技术博客",
                keywords: &["blog", "tech"],
                domains: &["overreacted.io", "kentcdodds.com", "joshwcomeau.com"],
            },
            BuiltinSubcategory {
                name: "微信公众号",
                keywords: &[],
                domains: &["mp.weixin.qq.com"],
            },
        ],
    },
    BuiltinCategory {
        name: "投资理财",
        keywords: &["stock", "trading", "finance", "invest", "etf", "option"],
        domains: &[
            "tradingview.com",
            "barchart.com",
            "yahoo.com",
            "finviz.com",
            "alpaca.markets",
            "etf.com",
        ],
        url_patterns: &[],
        subcategories: &[
            BuiltinSubcategory {
                name: "行情分析",
                keywords: &["chart", "analysis", "tradingview"],
                domains: &["tradingview.com", "barchart.com", "finviz.com"],
            },
            BuiltinSubcategory {
                name: "期权工具",
                keywords: &["option", "optionstrat"],
                domains: &["optionstrat.com", "optioncharts.io"],
            },
        ],
    },
    BuiltinCategory {
        name: "学习资源",
        keywords: &[
            "tutorial",
            "course",
            "learn",
            "doc",
            "documentation",
            "leetcode",
        ],
        domains: &["leetcode.cn", "nowcoder.com", "luogu.com.cn"],
        url_patterns: &[],
        subcategories: &[
            BuiltinSubcategory {
                name: "算法刷题",
                keywords: &["leetcode", "algorithm", "牛客"],
                domains: &["leetcode.cn", "nowcoder.com", "luogu.com.cn", "codetop.cc"],
            },
            BuiltinSubcategory {
                name: "技术文档",
                keywords: &["doc", "documentation", "api", "reference"],
                domains: &["developer.mozilla.org", "docs.microsoft.com"],
            },
        ],
    },
    BuiltinCategory {
        name: "娱乐生活",
        keywords: &[
            "music", "video", "movie", "game", "netflix", "youtube", "steam",
        ],
        domains: &["youtube.com", "netflix.com", "steam", "pixiv.net"],
        url_patterns: &[],
        subcategories: &[
            BuiltinSubcategory {
                name: "影视",
                keywords: &["movie", "tv", "netflix", "disney"],
                domains: &[
                    "netflix.com",
                    "disneyplus.com",
                    "themoviedb.org",
                    "justwatch.com",
                ],
            },
            BuiltinSubcategory {
                name: "音乐",
                keywords: &["music"],
                domains: &["musicforprogramming.net"],
            },
        ],
    },
    BuiltinCategory {
        name: "AI工具",
        keywords: &[
            "ai",
            "gpt",
            "claude",
            "chatgpt",
            "openai",
            "anthropic",
            "perplexity",
        ],
        domains: &[
            "anthropic.com",
            "openai.com",
            "perplexity.ai",
            "siliconflow.cn",
        ],
        url_patterns: &[],
        subcategories: &[
            BuiltinSubcategory {
                name: "AI对话",
                keywords: &["chat", "gpt", "claude"],
                domains: &["anthropic.com", "openai.com", "perplexity.ai"],
            },
            BuiltinSubcategory {
                name: "AI绘图",
                keywords: &["image", "draw", "midjourney", "stable", "ideogram"],
                domains: &["ideogram.ai", "craiyon.com"],
            },
        ],
    },
];
