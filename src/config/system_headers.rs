//! Built-in list of standard library and common system headers.
//!
//! Includes of these never produce a dependency edge.

/// C++ standard library headers.
pub const CPP_STD_HEADERS: &[&str] = &[
    "algorithm", "any", "array", "atomic", "barrier", "bit", "bitset", "charconv", "chrono",
    "codecvt", "compare", "complex", "concepts", "condition_variable", "coroutine", "deque",
    "exception", "execution", "expected", "filesystem", "format", "forward_list", "fstream",
    "functional", "future", "initializer_list", "iomanip", "ios", "iosfwd", "iostream",
    "istream", "iterator", "latch", "limits", "list", "locale", "map", "memory",
    "memory_resource", "mutex", "new", "numbers", "numeric", "optional", "ostream", "print",
    "queue", "random", "ranges", "ratio", "regex", "scoped_allocator", "semaphore", "set",
    "shared_mutex", "source_location", "span", "spanstream", "sstream", "stack", "stacktrace",
    "stdexcept", "stop_token", "streambuf", "string", "string_view", "syncstream",
    "system_error", "thread", "tuple", "type_traits", "typeindex", "typeinfo",
    "unordered_map", "unordered_set", "utility", "valarray", "variant", "vector", "version",
    "cassert", "cctype", "cerrno", "cfenv", "cfloat", "cinttypes", "climits", "clocale",
    "cmath", "csetjmp", "csignal", "cstdarg", "cstddef", "cstdint", "cstdio", "cstdlib",
    "cstring", "ctime", "cuchar", "cwchar", "cwctype",
];

/// C standard library headers.
pub const C_STD_HEADERS: &[&str] = &[
    "assert.h", "complex.h", "ctype.h", "errno.h", "fenv.h", "float.h", "inttypes.h",
    "iso646.h", "limits.h", "locale.h", "math.h", "setjmp.h", "signal.h", "stdalign.h",
    "stdarg.h", "stdatomic.h", "stdbool.h", "stddef.h", "stdint.h", "stdio.h", "stdlib.h",
    "stdnoreturn.h", "string.h", "tgmath.h", "threads.h", "time.h", "uchar.h", "wchar.h",
    "wctype.h",
];

/// POSIX and Linux system headers commonly found in server code.
pub const SYSTEM_HEADERS: &[&str] = &[
    "arpa/inet.h", "dirent.h", "dlfcn.h", "execinfo.h", "fcntl.h", "getopt.h", "glob.h",
    "grp.h", "ifaddrs.h", "libgen.h", "netdb.h", "netinet/in.h", "netinet/tcp.h", "poll.h",
    "pthread.h", "pwd.h", "sched.h", "semaphore.h", "spawn.h", "strings.h", "syslog.h",
    "termios.h", "unistd.h", "utime.h", "sys/epoll.h", "sys/eventfd.h", "sys/file.h",
    "sys/inotify.h", "sys/ioctl.h", "sys/mman.h", "sys/param.h", "sys/prctl.h",
    "sys/resource.h", "sys/select.h", "sys/socket.h", "sys/stat.h", "sys/syscall.h",
    "sys/sysinfo.h", "sys/time.h", "sys/timerfd.h", "sys/types.h", "sys/uio.h", "sys/un.h",
    "sys/utsname.h", "sys/wait.h", "linux/futex.h", "linux/limits.h", "malloc.h",
    "cxxabi.h",
];

/// All built-in headers as one iterator.
pub fn default_system_headers() -> impl Iterator<Item = &'static str> {
    CPP_STD_HEADERS.iter().chain(C_STD_HEADERS).chain(SYSTEM_HEADERS).copied()
}
